// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sentinel_config::model::ServerConfig;
use sentinel_core::SentinelError;
use sentinel_gate::AccessGate;
use sentinel_vault::SecretVault;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer;
use crate::handlers;

/// Process-level counters for the health report.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    auth_failures: Arc<AtomicU64>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            auth_failures: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl HealthState {
    /// Count one rejected login or bearer token.
    pub fn record_auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn auth_failures(&self) -> u64 {
        self.auth_failures.load(Ordering::Relaxed)
    }
}

/// Shared state for axum request handlers.
///
/// Built once at startup and cloned into every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub vault: Arc<SecretVault>,
    pub gate: Arc<AccessGate>,
    pub health: HealthState,
    /// Name reported by the root endpoint.
    pub service_name: Arc<str>,
}

impl AppState {
    pub fn new(vault: SecretVault, gate: AccessGate, service_name: &str) -> Self {
        Self {
            vault: Arc::new(vault),
            gate: Arc::new(gate),
            health: HealthState::default(),
            service_name: Arc::from(service_name),
        }
    }
}

/// Build the application router.
///
/// Public routes:
/// - GET /, GET /audit/health, GET /vault/status
/// - POST /auth/register, POST /auth/login
///
/// Bearer-protected routes:
/// - POST /vault/encrypt, POST /vault/decrypt
/// - GET /auth/me
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::get_root))
        .route("/audit/health", get(handlers::get_audit_health))
        .route("/vault/status", get(handlers::get_vault_status))
        .route("/auth/register", post(handlers::post_register))
        .route("/auth/login", post(handlers::post_login));

    let protected_routes = Router::new()
        .route("/vault/encrypt", post(handlers::post_encrypt))
        .route("/vault/decrypt", post(handlers::post_decrypt))
        .route("/auth/me", get(handlers::get_me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: AppState,
    shutdown: F,
) -> Result<(), SentinelError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SentinelError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| SentinelError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_state_counts_across_clones() {
        let health = HealthState::default();
        let clone = health.clone();
        clone.record_auth_failure();
        clone.record_auth_failure();
        assert_eq!(health.auth_failures(), 2);
    }
}
