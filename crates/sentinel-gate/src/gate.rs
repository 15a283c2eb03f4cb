// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration and login on top of the hasher, the issuer and a user store.

use std::sync::Arc;

use chrono::Utc;
use sentinel_core::{Credential, HashedPassword, SentinelError, UserProfile, UserStore};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::hasher::CredentialHasher;
use crate::token::{Claims, TokenIssuer, VerifiedToken};

/// Password used to build the stand-in hash for unknown usernames.
const DUMMY_PASSWORD: &str = "sentinel-timing-equalizer";

/// A freshly issued access token plus the user it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AccessGrant {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub user: UserProfile,
}

/// The authentication contract consumed by the route layer.
pub struct AccessGate {
    hasher: CredentialHasher,
    issuer: TokenIssuer,
    store: Arc<dyn UserStore>,
    default_role: String,
    dummy_hash: HashedPassword,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("hasher", &self.hasher)
            .field("issuer", &self.issuer)
            .field("default_role", &self.default_role)
            .finish_non_exhaustive()
    }
}

impl AccessGate {
    /// Assemble a gate. Computes the stand-in hash used for unknown users.
    pub fn new(
        hasher: CredentialHasher,
        issuer: TokenIssuer,
        store: Arc<dyn UserStore>,
        default_role: impl Into<String>,
    ) -> Result<Self, SentinelError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            hasher,
            issuer,
            store,
            default_role: default_role.into(),
            dummy_hash,
        })
    }

    /// Create a new user.
    ///
    /// `role` falls back to the configured default role.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Credential, SentinelError> {
        if username.trim().is_empty() {
            return Err(SentinelError::Validation(
                "username must not be empty".to_string(),
            ));
        }
        let role = match role.map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => self.default_role.clone(),
        };

        // Cheap early exit; the store's put is still the authority.
        if self.store.get(username)?.is_some() {
            return Err(SentinelError::DuplicateUser {
                username: username.to_string(),
            });
        }

        let credential = Credential {
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            role,
            created_at: Utc::now(),
        };
        self.store.put(credential.clone())?;

        info!(username, role = %credential.role, "user registered");
        Ok(credential)
    }

    /// Check a username and password and issue a token on success.
    ///
    /// Unknown users and wrong passwords fail identically with
    /// [`SentinelError::InvalidCredentials`], and take comparable time.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AccessGrant, SentinelError> {
        let Some(credential) = self.store.get(username)? else {
            let _ = self.hasher.verify(password, &self.dummy_hash);
            warn!(username, "login rejected");
            return Err(SentinelError::InvalidCredentials);
        };

        match self.hasher.verify(password, &credential.password_hash) {
            Ok(true) => {
                info!(username, "login succeeded");
                self.grant(&credential)
            }
            Ok(false) => {
                warn!(username, "login rejected");
                Err(SentinelError::InvalidCredentials)
            }
            Err(SentinelError::MalformedHash(detail)) => {
                error!(username, %detail, "stored password hash is corrupt");
                Err(SentinelError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    /// Issue a token for `credential` with the default lifetime.
    pub fn grant(&self, credential: &Credential) -> Result<AccessGrant, SentinelError> {
        let claims = Claims::new()
            .with("sub", credential.username.as_str())
            .with("role", credential.role.as_str());
        let access_token = self.issuer.issue_default(claims)?;
        Ok(AccessGrant {
            access_token,
            token_type: "bearer",
            expires_in: self.issuer.default_ttl().as_secs(),
            user: UserProfile::from(credential),
        })
    }

    /// Verify a bearer token.
    pub fn introspect(&self, token: &str) -> Result<VerifiedToken, SentinelError> {
        self.issuer.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryUserStore;
    use tracing_test::traced_test;

    fn gate_with(store: Arc<MemoryUserStore>) -> AccessGate {
        AccessGate::new(
            CredentialHasher::new(8, 1, 1).unwrap(),
            TokenIssuer::new(b"gate-unit-test-secret-0123456789abcdef", Duration::from_secs(600))
                .unwrap(),
            store,
            "user",
        )
        .unwrap()
    }

    #[test]
    fn register_applies_default_role() {
        let gate = gate_with(Arc::new(MemoryUserStore::new()));
        assert_eq!(gate.register("dana", "pw", None).unwrap().role, "user");
        assert_eq!(gate.register("erin", "pw", Some("  ")).unwrap().role, "user");
        assert_eq!(gate.register("finn", "pw", Some("admin")).unwrap().role, "admin");
    }

    #[test]
    fn register_rejects_blank_username() {
        let gate = gate_with(Arc::new(MemoryUserStore::new()));
        assert!(matches!(
            gate.register("   ", "pw", None),
            Err(SentinelError::Validation(_))
        ));
    }

    #[test]
    fn register_never_stores_plaintext() {
        let store = Arc::new(MemoryUserStore::new());
        let gate = gate_with(Arc::clone(&store));
        gate.register("gus", "hunter2", None).unwrap();
        let stored = store.get("gus").unwrap().unwrap();
        assert!(!stored.password_hash.as_str().contains("hunter2"));
    }

    #[test]
    fn grant_reports_lifetime_and_profile() {
        let gate = gate_with(Arc::new(MemoryUserStore::new()));
        let credential = gate.register("hana", "pw", None).unwrap();
        let grant = gate.grant(&credential).unwrap();
        assert_eq!(grant.token_type, "bearer");
        assert_eq!(grant.expires_in, 600);
        assert_eq!(grant.user.username, "hana");
    }

    #[test]
    #[traced_test]
    fn corrupt_hash_is_logged_and_uniform() {
        let store = Arc::new(MemoryUserStore::new());
        store
            .put(Credential {
                username: "ivan".into(),
                password_hash: HashedPassword::new("not-a-phc-string"),
                role: "user".into(),
                created_at: Utc::now(),
            })
            .unwrap();
        let gate = gate_with(store);

        let err = gate.authenticate("ivan", "pw").unwrap_err();
        assert!(matches!(err, SentinelError::InvalidCredentials));
        assert!(logs_contain("stored password hash is corrupt"));
    }
}
