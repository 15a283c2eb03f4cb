// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token middleware for the protected routes.
//!
//! The token is verified through the access gate. On success the
//! [`VerifiedToken`](sentinel_gate::VerifiedToken) is placed in the request
//! extensions for handlers to read.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sentinel_core::SentinelError;

use crate::error::ApiError;
use crate::server::AppState;

/// Reject requests without a valid `Authorization: Bearer <token>` header.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        state.health.record_auth_failure();
        return Err(SentinelError::InvalidToken("missing bearer token".to_string()).into());
    };

    let verified = state.gate.introspect(token).inspect_err(|e| {
        state.health.record_auth_failure();
        tracing::warn!(error = %e, path = %request.uri().path(), "bearer token rejected");
    })?;

    request.extensions_mut().insert(verified);
    Ok(next.run(request).await)
}

/// Extract the credentials from a `Bearer` authorization value.
///
/// The scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
