// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sentinel serve` implementation.
//!
//! Builds the vault, the access gate and its user store from configuration,
//! then serves the HTTP gateway until SIGINT or SIGTERM.

use std::sync::Arc;

use sentinel_config::SentinelConfig;
use sentinel_core::SentinelError;
use sentinel_gate::{AccessGate, CredentialHasher, JsonFileUserStore, TokenIssuer};
use sentinel_gateway::AppState;
use sentinel_vault::SecretVault;
use tracing::{info, warn};

/// Runs the `sentinel serve` command.
///
/// Missing key material fails here, before the listener is bound.
pub async fn run_serve(config: SentinelConfig) -> Result<(), SentinelError> {
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        "starting sentinel"
    );

    let state = build_state(&config)?;
    sentinel_gateway::start_server(&config.server, state, shutdown_signal()).await?;

    info!("sentinel serve shutdown complete");
    Ok(())
}

/// Construct the shared gateway state from configuration.
pub fn build_state(config: &SentinelConfig) -> Result<AppState, SentinelError> {
    let vault = SecretVault::from_config(&config.vault)?;
    let issuer = TokenIssuer::from_config(&config.auth)?;
    let hasher = CredentialHasher::from_config(&config.hashing)?;
    let store = JsonFileUserStore::open(&config.storage.users_path)?;
    let gate = AccessGate::new(hasher, issuer, Arc::new(store), config.auth.default_role.as_str())?;
    Ok(AppState::new(vault, gate, &config.service.name))
}

/// Initialize the tracing subscriber with an env filter.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// workspace crates and everything else logs at warn.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sentinel={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
        _ = terminate => info!("received SIGTERM, initiating shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER_KEY: &str = "q2Jm9Zp0rV3xN8cT1uL5wE7yH4kA6sD0fG2hJ4kL6mM=";
    const JWT_SECRET: &str = "serve-test-signing-secret-0123456789abcdef";

    fn config_in(dir: &std::path::Path) -> SentinelConfig {
        let mut config = SentinelConfig::default();
        config.vault.master_key = Some(MASTER_KEY.to_string());
        config.auth.jwt_secret = Some(JWT_SECRET.to_string());
        config.hashing.memory_cost = 8;
        config.hashing.iterations = 1;
        config.storage.users_path = dir.join("users.json").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn builds_state_from_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        let state = build_state(&config_in(dir.path())).unwrap();
        let payload = state.vault.encrypt("hello").unwrap();
        assert_eq!(state.vault.decrypt(&payload).unwrap(), "hello");
        assert_eq!(&*state.service_name, "sentinel");
    }

    #[test]
    fn missing_master_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.vault.master_key = None;
        let err = build_state(&config).unwrap_err();
        assert!(matches!(err, SentinelError::MissingKey { name: "vault.master_key" }));
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_signing_secret_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.auth.jwt_secret = None;
        let err = build_state(&config).unwrap_err();
        assert!(matches!(err, SentinelError::MissingKey { name: "auth.jwt_secret" }));
    }
}
