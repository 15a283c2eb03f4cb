// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the SentinelCloud credential service.
//!
//! Provides the workspace error type, the credential types exchanged between
//! the access gate and its user store, and the [`UserStore`] trait that
//! storage backends implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::SentinelError;
pub use traits::UserStore;
pub use types::{Credential, HashedPassword, UserProfile};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_credential() -> Credential {
        Credential {
            username: "alice".into(),
            password_hash: HashedPassword::new("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$ZGlnZXN0"),
            role: "user".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fatal_errors_are_startup_errors() {
        assert!(SentinelError::MissingKey { name: "vault.master_key" }.is_fatal());
        assert!(SentinelError::InvalidKey("bad".into()).is_fatal());
        assert!(SentinelError::Config("bad".into()).is_fatal());
        assert!(!SentinelError::Decryption.is_fatal());
        assert!(!SentinelError::InvalidCredentials.is_fatal());
        assert!(!SentinelError::InvalidToken("expired".into()).is_fatal());
    }

    #[test]
    fn opaque_messages_do_not_carry_detail() {
        assert_eq!(
            SentinelError::Decryption.to_string(),
            "decryption failed: invalid key or corrupted data"
        );
        assert_eq!(
            SentinelError::InvalidCredentials.to_string(),
            "incorrect username or password"
        );
    }

    #[test]
    fn storage_wraps_source() {
        let err = SentinelError::storage(std::io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn hashed_password_debug_is_redacted() {
        let cred = sample_credential();
        let debug = format!("{cred:?}");
        assert!(!debug.contains("argon2id"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn credential_serializes_hash_under_legacy_field_name() {
        let cred = sample_credential();
        let json = serde_json::to_value(&cred).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json["hashed_password"].as_str().unwrap().starts_with("$argon2id$"));

        let back: Credential = serde_json::from_value(json).unwrap();
        assert_eq!(back, cred);
    }

    #[test]
    fn profile_omits_hash() {
        let cred = sample_credential();
        let profile = UserProfile::from(&cred);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"user\""));
    }
}
