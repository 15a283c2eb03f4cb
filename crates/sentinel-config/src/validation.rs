// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express. Presence of the master
//! key and signing secret is not checked here: the vault and token issuer
//! report those as fatal `MissingKey` errors when they are constructed.

use crate::diagnostic::ConfigError;
use crate::model::SentinelConfig;

/// Smallest accepted Argon2id memory cost, in KiB.
pub const MIN_HASH_MEMORY_COST: u32 = 8192;

/// Longest accepted token lifetime, in minutes (one year).
pub const MAX_TOKEN_TTL_MINUTES: u64 = 525_600;

/// Smallest accepted signing secret length, in bytes (HS256 key size).
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &SentinelConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if config.auth.token_ttl_minutes == 0 {
        errors.push(ConfigError::validation(
            "auth.token_ttl_minutes must be at least 1",
        ));
    } else if config.auth.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
        errors.push(ConfigError::validation(format!(
            "auth.token_ttl_minutes must be at most {MAX_TOKEN_TTL_MINUTES}, got {}",
            config.auth.token_ttl_minutes
        )));
    }

    if config.auth.default_role.trim().is_empty() {
        errors.push(ConfigError::validation("auth.default_role must not be empty"));
    }

    if let Some(secret) = config.auth.jwt_secret.as_deref()
        && secret.len() < MIN_JWT_SECRET_LEN
    {
        errors.push(ConfigError::validation(format!(
            "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes, got {}",
            secret.len()
        )));
    }

    if let (Some(secret), Some(key)) = (
        config.auth.jwt_secret.as_deref(),
        config.vault.master_key.as_deref(),
    ) && secret == key
    {
        errors.push(ConfigError::validation(
            "auth.jwt_secret must differ from vault.master_key",
        ));
    }

    if config.hashing.memory_cost < MIN_HASH_MEMORY_COST {
        errors.push(ConfigError::validation(format!(
            "hashing.memory_cost must be at least {MIN_HASH_MEMORY_COST} (8 MiB), got {}",
            config.hashing.memory_cost
        )));
    }

    if config.hashing.iterations < 1 {
        errors.push(ConfigError::validation("hashing.iterations must be at least 1"));
    }

    if config.hashing.parallelism < 1 {
        errors.push(ConfigError::validation("hashing.parallelism must be at least 1"));
    }

    if config.storage.users_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.users_path must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
