// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{SecondsFormat, Utc};
use sentinel_core::SentinelError;
use sentinel_gate::{AccessGrant, VerifiedToken};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::error::{ApiError, ApiJson};
use crate::server::AppState;

/// Response body for GET /.
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub service: String,
    pub vault_status: String,
}

/// Response body for GET /audit/health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub os: String,
    pub node: String,
    pub os_version: String,
    pub status: String,
    pub uptime_secs: u64,
    /// Rejected logins and bearer tokens since start.
    pub unauthorized_access_attempts: u64,
}

/// Response body for GET /vault/status.
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultStatusResponse {
    pub status: String,
    pub encryption: String,
    /// Non-secret key identifier.
    pub key_fingerprint: String,
    pub timestamp: String,
}

/// Request body for POST /vault/encrypt and POST /vault/decrypt.
#[derive(Deserialize)]
pub struct SecretRequest {
    pub secret: String,
}

/// Response body for POST /vault/encrypt.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub encrypted: String,
    pub timestamp: String,
}

/// Response body for POST /vault/decrypt.
#[derive(Debug, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub decrypted: String,
    pub timestamp: String,
}

/// Request body for POST /auth/register.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Request body for POST /auth/login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for GET /auth/me.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub subject: Option<String>,
    pub role: Option<String>,
    /// RFC 3339 expiry instant.
    pub expiry: String,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run CPU-heavy gate work (Argon2) off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, SentinelError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SentinelError::Internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

/// GET /
pub async fn get_root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "SentinelCloud API is operational. System monitoring active.".to_string(),
        service: state.service_name.to_string(),
        vault_status: "OPERATIONAL".to_string(),
    })
}

/// GET /audit/health
///
/// Host identity from static system queries plus process counters.
pub async fn get_audit_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        timestamp: now_rfc3339(),
        os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
        node: System::host_name().unwrap_or_default(),
        os_version: System::os_version().unwrap_or_default(),
        status: "SECURE".to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        unauthorized_access_attempts: state.health.auth_failures(),
    })
}

/// GET /vault/status
pub async fn get_vault_status(State(state): State<AppState>) -> Json<VaultStatusResponse> {
    Json(VaultStatusResponse {
        status: "OPERATIONAL".to_string(),
        encryption: sentinel_vault::ALGORITHM.to_string(),
        key_fingerprint: state.vault.key_fingerprint(),
        timestamp: now_rfc3339(),
    })
}

/// POST /vault/encrypt
pub async fn post_encrypt(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SecretRequest>,
) -> Result<Json<EncryptResponse>, ApiError> {
    let encrypted = state.vault.encrypt(&body.secret)?;
    Ok(Json(EncryptResponse {
        encrypted,
        timestamp: now_rfc3339(),
    }))
}

/// POST /vault/decrypt
pub async fn post_decrypt(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SecretRequest>,
) -> Result<Json<DecryptResponse>, ApiError> {
    let decrypted = state.vault.decrypt(&body.secret)?;
    Ok(Json(DecryptResponse {
        decrypted,
        timestamp: now_rfc3339(),
    }))
}

/// POST /auth/register
///
/// Creates the user and returns a token for it, so a client can register and
/// proceed without a separate login.
pub async fn post_register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AccessGrant>), ApiError> {
    let gate = state.gate.clone();
    let grant = run_blocking(move || {
        let credential = gate.register(&body.username, &body.password, body.role.as_deref())?;
        gate.grant(&credential)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(grant)))
}

/// POST /auth/login
pub async fn post_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AccessGrant>, ApiError> {
    let gate = state.gate.clone();
    let result = run_blocking(move || gate.authenticate(&body.username, &body.password)).await;
    if matches!(result, Err(ApiError(SentinelError::InvalidCredentials))) {
        state.health.record_auth_failure();
    }
    result.map(Json)
}

/// GET /auth/me
pub async fn get_me(Extension(token): Extension<VerifiedToken>) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        subject: token.subject().map(str::to_string),
        role: token.role().map(str::to_string),
        expiry: token.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}
