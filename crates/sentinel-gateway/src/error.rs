// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`SentinelError`] to HTTP responses.
//!
//! Bodies are always `{"detail": "..."}` with a generic message. Library
//! detail stays in the logs.

use axum::{
    extract::{FromRequest, Request},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sentinel_core::SentinelError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// A [`SentinelError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub SentinelError);

impl From<SentinelError> for ApiError {
    fn from(err: SentinelError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code and caller-visible message.
    fn parts(&self) -> (StatusCode, String) {
        match &self.0 {
            SentinelError::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            err @ SentinelError::DuplicateUser { .. } => (StatusCode::CONFLICT, err.to_string()),
            err @ SentinelError::Decryption => (StatusCode::BAD_REQUEST, err.to_string()),
            SentinelError::InvalidCredentials | SentinelError::MalformedHash(_) => (
                StatusCode::UNAUTHORIZED,
                SentinelError::InvalidCredentials.to_string(),
            ),
            SentinelError::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                "could not validate credentials".to_string(),
            ),
            SentinelError::Encryption(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "encryption failed".to_string(),
            ),
            SentinelError::MissingKey { .. }
            | SentinelError::InvalidKey(_)
            | SentinelError::Config(_)
            | SentinelError::Storage { .. }
            | SentinelError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let mut response = (status, Json(ErrorResponse { detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// JSON request body extractor whose rejections use the `{"detail"}` shape.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let status = rejection.status();
                tracing::debug!(status = status.as_u16(), "request body rejected");
                Err((
                    status,
                    Json(ErrorResponse {
                        detail: rejection.body_text(),
                    }),
                )
                    .into_response())
            }
        }
    }
}
