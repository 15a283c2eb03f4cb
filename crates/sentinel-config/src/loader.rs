// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sentinel.toml` > `~/.config/sentinel/sentinel.toml` > `/etc/sentinel/sentinel.toml`
//! with environment variable overrides via `SENTINEL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SentinelConfig;

/// Config sections addressable through `SENTINEL_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &["service", "server", "vault", "auth", "hashing", "storage"];

/// Legacy variable holding the vault master key.
pub const MASTER_KEY_ENV_VAR: &str = "SENTINEL_MASTER_KEY";

/// Legacy variable holding the token signing secret.
pub const JWT_SECRET_ENV_VAR: &str = "JWT_SECRET_KEY";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sentinel/sentinel.toml` (system-wide)
/// 3. `~/.config/sentinel/sentinel.toml` (user XDG config)
/// 4. `./sentinel.toml` (local directory)
/// 5. `SENTINEL_*` environment variables
/// 6. Legacy `SENTINEL_MASTER_KEY` / `JWT_SECRET_KEY` variables
pub fn load_config() -> Result<SentinelConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SentinelConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SentinelConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SentinelConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SentinelConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(legacy_env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SentinelConfig::default()))
        .merge(Toml::file("/etc/sentinel/sentinel.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("sentinel/sentinel.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("sentinel.toml"))
        .merge(env_provider())
        .merge(legacy_env_provider())
}

/// `SENTINEL_<SECTION>_<KEY>` -> `<section>.<key>`.
///
/// Uses an explicit section prefix match instead of `Env::split("_")` because
/// key names contain underscores: `SENTINEL_AUTH_TOKEN_TTL_MINUTES` must map to
/// `auth.token_ttl_minutes`, not `auth.token.ttl.minutes`.
fn env_provider() -> Env {
    Env::prefixed("SENTINEL_")
        .ignore(&["MASTER_KEY"])
        .map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// The unprefixed names the service has always read its two secrets from.
fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&[MASTER_KEY_ENV_VAR, JWT_SECRET_ENV_VAR])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case(MASTER_KEY_ENV_VAR) {
                "vault.master_key".into()
            } else {
                "auth.jwt_secret".into()
            }
        })
}

/// Map a lowercased, prefix-stripped env key to a dotted config path.
///
/// Figment hands `map` the key in its original case; it lowercases only
/// afterwards, so callers lowercase first.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
