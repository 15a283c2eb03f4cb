// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the SentinelCloud credential core.

use thiserror::Error;

/// The primary error type used across the vault, the access gate and the
/// HTTP gateway.
///
/// Messages for [`Decryption`](SentinelError::Decryption) and
/// [`InvalidCredentials`](SentinelError::InvalidCredentials) are constant so
/// they can be shown to untrusted callers without acting as an oracle.
#[derive(Debug, Error)]
pub enum SentinelError {
    /// A required key or secret was not configured. Fatal at startup.
    #[error("missing key material: {name} is not configured")]
    MissingKey { name: &'static str },

    /// A configured key could not be decoded into usable key material.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// Encryption failed inside the AEAD or the randomness source.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed: malformed payload, wrong key or tampered data.
    #[error("decryption failed: invalid key or corrupted data")]
    Decryption,

    /// A stored password hash is not a structurally valid PHC string.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    /// Token validation failed (structure, algorithm, signature or expiry).
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// The username is already registered.
    #[error("user `{username}` already exists")]
    DuplicateUser { username: String },

    /// Caller input failed validation (e.g. empty username).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors outside the figment diagnostics path.
    #[error("configuration error: {0}")]
    Config(String),

    /// User store backend errors (file I/O, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SentinelError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Whether the process must not keep serving after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingKey { .. } | Self::InvalidKey(_) | Self::Config(_)
        )
    }
}
