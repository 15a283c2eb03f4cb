// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the SentinelCloud service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level SentinelCloud configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults sensibly, but
/// the service refuses to start without `vault.master_key` and
/// `auth.jwt_secret`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SentinelConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Secret vault key material.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Token issuance settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Argon2id password hashing cost.
    #[serde(default)]
    pub hashing: HashingConfig,

    /// User store location.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name reported by the root endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "sentinel".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the HTTP server to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Secret vault configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Master encryption key: 32 bytes, url-safe base64.
    ///
    /// Also read from the legacy `SENTINEL_MASTER_KEY` environment variable.
    #[serde(default)]
    pub master_key: Option<String>,
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Token issuance configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC signing secret for access tokens. Must differ from the master key.
    ///
    /// Also read from the legacy `JWT_SECRET_KEY` environment variable.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Lifetime of issued access tokens, in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,

    /// Role assigned at registration when the caller does not provide one.
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: default_token_ttl_minutes(),
            default_role: default_role(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("default_role", &self.default_role)
            .finish()
    }
}

impl AuthConfig {
    /// Token lifetime as a [`std::time::Duration`].
    pub fn token_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.token_ttl_minutes.saturating_mul(60))
    }
}

fn default_token_ttl_minutes() -> u64 {
    30
}

fn default_role() -> String {
    "user".to_string()
}

/// Argon2id cost parameters for password hashing.
///
/// Defaults follow the OWASP baseline (19 MiB, 2 iterations, 1 lane).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,

    /// Number of iterations.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_memory_cost(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_memory_cost() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

/// User store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the JSON user database.
    #[serde(default = "default_users_path")]
    pub users_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_path: default_users_path(),
        }
    }
}

fn default_users_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("sentinel").join("users.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("users.json"))
        .to_string_lossy()
        .into_owned()
}
