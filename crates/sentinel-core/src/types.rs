// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential types shared by the access gate, the user stores and the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A self-describing password hash (PHC string format).
///
/// Bundles algorithm identifier, cost parameters, salt and digest, so
/// verification needs nothing but this string and the candidate password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap an encoded hash string without validating it.
    ///
    /// Validation happens on verify, where a malformed value surfaces as
    /// [`SentinelError::MalformedHash`](crate::SentinelError::MalformedHash).
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

/// A registered user: username plus derived password hash. Never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique, case-sensitive, non-empty identifier.
    pub username: String,
    /// Argon2id hash of the password.
    #[serde(rename = "hashed_password")]
    pub password_hash: HashedPassword,
    /// Role claim carried into issued tokens.
    pub role: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, safe to return to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Credential> for UserProfile {
    fn from(credential: &Credential) -> Self {
        Self {
            username: credential.username.clone(),
            role: credential.role.clone(),
            created_at: credential.created_at,
        }
    }
}
