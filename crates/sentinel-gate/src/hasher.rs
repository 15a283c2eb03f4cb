// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`) so the
//! cost parameters travel with the hash. Verification uses the embedded
//! parameters, which keeps old hashes valid after the configured cost changes.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use ring::rand::{SecureRandom, SystemRandom};
use sentinel_config::model::HashingConfig;
use sentinel_core::{HashedPassword, SentinelError};

/// Random salt length in bytes.
const SALT_LEN: usize = 16;

/// One-way salted password hasher.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    params: Params,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("memory_cost", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}

impl CredentialHasher {
    /// Create a hasher with explicit Argon2id cost parameters.
    pub fn new(memory_cost: u32, iterations: u32, parallelism: u32) -> Result<Self, SentinelError> {
        let params = Params::new(memory_cost, iterations, parallelism, None)
            .map_err(|e| SentinelError::Config(format!("invalid Argon2id parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
        Ok(Self { argon2, params })
    }

    /// Create a hasher from the `[hashing]` section.
    pub fn from_config(config: &HashingConfig) -> Result<Self, SentinelError> {
        Self::new(config.memory_cost, config.iterations, config.parallelism)
    }

    /// Hash `password` under a fresh random salt.
    ///
    /// The empty password is accepted.
    pub fn hash(&self, password: &str) -> Result<HashedPassword, SentinelError> {
        let salt = generate_salt()?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| SentinelError::Internal(format!("Argon2id hashing failed: {e}")))?;
        Ok(HashedPassword::new(hash.to_string()))
    }

    /// Check `password` against a stored hash.
    ///
    /// A wrong password is `Ok(false)`, never an error. A hash string that is
    /// not a valid Argon2 PHC string is [`SentinelError::MalformedHash`].
    pub fn verify(&self, password: &str, hashed: &HashedPassword) -> Result<bool, SentinelError> {
        let parsed = PasswordHash::new(hashed.as_str())
            .map_err(|e| SentinelError::MalformedHash(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(SentinelError::MalformedHash(e.to_string())),
        }
    }
}

fn generate_salt() -> Result<SaltString, SentinelError> {
    let mut bytes = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| SentinelError::Internal("failed to generate random salt".to_string()))?;
    SaltString::encode_b64(&bytes)
        .map_err(|e| SentinelError::Internal(format!("failed to encode salt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the suite fast.
    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(8, 1, 1).unwrap()
    }

    #[test]
    fn hash_verifies_and_rejects_wrong_password() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("pw123").unwrap();
        assert!(hasher.verify("pw123", &hashed).unwrap());
        assert!(!hasher.verify("wrongpw", &hashed).unwrap());
    }

    #[test]
    fn hash_is_salted_per_call() {
        let hasher = fast_hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a).unwrap());
        assert!(hasher.verify("same", &b).unwrap());
    }

    #[test]
    fn hash_is_self_describing_argon2id() {
        let hashed = CredentialHasher::new(19456, 2, 1).unwrap().hash("x").unwrap();
        assert!(hashed.as_str().starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn empty_password_is_accepted() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("").unwrap();
        assert!(hasher.verify("", &hashed).unwrap());
        assert!(!hasher.verify(" ", &hashed).unwrap());
    }

    #[test]
    fn embedded_parameters_win_over_configured_ones() {
        let old = CredentialHasher::new(16, 1, 1).unwrap().hash("legacy").unwrap();
        assert!(fast_hasher().verify("legacy", &old).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = fast_hasher();
        for bad in ["", "plaintext", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$!!!"] {
            let err = hasher.verify("pw", &HashedPassword::new(bad)).unwrap_err();
            assert!(matches!(err, SentinelError::MalformedHash(_)), "{bad:?}");
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            CredentialHasher::new(0, 0, 0),
            Err(SentinelError::Config(_))
        ));
    }
}
