// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The secret vault: encrypt and decrypt short text secrets under one master key.
//!
//! Payload layout, before url-safe base64 (padded):
//!
//! ```text
//! +---------+-------------+----------------------+-----------+
//! | version | nonce (12)  | ciphertext (n)       | tag (16)  |
//! +---------+-------------+----------------------+-----------+
//! ```
//!
//! The version byte is also the AEAD associated data, so it cannot be
//! swapped without failing authentication.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use ring::aead::{LessSafeKey, NONCE_LEN};
use ring::rand::SystemRandom;
use sentinel_config::model::VaultConfig;
use sentinel_core::SentinelError;
use tracing::{debug, info};

use crate::crypto::{self, TAG_LEN};
use crate::key::KeyMaterial;

/// Current payload format version.
const PAYLOAD_VERSION: u8 = 0x01;

/// Smallest well-formed payload: version, nonce, tag, empty ciphertext.
const MIN_PAYLOAD_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

/// Human-readable name of the cipher, reported by status endpoints.
pub const ALGORITHM: &str = "AES-256-GCM";

/// Authenticated symmetric encryption service.
///
/// Holds only immutable key material after construction, so one instance can
/// be shared (`Arc<SecretVault>`) across any number of concurrent callers.
pub struct SecretVault {
    key: KeyMaterial,
    cipher: LessSafeKey,
    rng: SystemRandom,
}

impl std::fmt::Debug for SecretVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretVault")
            .field("algorithm", &ALGORITHM)
            .field("key_fingerprint", &self.key.fingerprint())
            .finish()
    }
}

impl SecretVault {
    /// Build a vault that exclusively owns `key`.
    pub fn new(key: KeyMaterial) -> Result<Self, SentinelError> {
        let cipher = crypto::cipher_for(&key)?;
        info!(key_fingerprint = %key.fingerprint(), "secret vault initialized");
        Ok(Self {
            key,
            cipher,
            rng: SystemRandom::new(),
        })
    }

    /// Build a vault from `[vault]` configuration.
    ///
    /// Fails with [`SentinelError::MissingKey`] when `master_key` is absent or
    /// blank. The service must not start in that case.
    pub fn from_config(config: &VaultConfig) -> Result<Self, SentinelError> {
        let encoded = config
            .master_key
            .as_deref()
            .ok_or(SentinelError::MissingKey {
                name: "vault.master_key",
            })?;
        Self::new(KeyMaterial::from_encoded(encoded)?)
    }

    /// Encrypt `plaintext` into an opaque, transport-safe payload.
    ///
    /// Any text is accepted, including the empty string. Two calls with the
    /// same input produce different payloads.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, SentinelError> {
        let (nonce, ciphertext) = crypto::seal(
            &self.cipher,
            &self.rng,
            &[PAYLOAD_VERSION],
            plaintext.as_bytes(),
        )?;

        let mut payload = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        payload.push(PAYLOAD_VERSION);
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);

        debug!(payload_len = payload.len(), "secret encrypted");
        Ok(URL_SAFE.encode(payload))
    }

    /// Decrypt a payload produced by [`encrypt`](Self::encrypt) under the same key.
    ///
    /// Every failure (bad encoding, wrong version, truncation, wrong key,
    /// tampering, non-UTF-8 plaintext) is the same
    /// [`SentinelError::Decryption`]. The specific cause is logged at debug.
    pub fn decrypt(&self, payload: &str) -> Result<String, SentinelError> {
        let raw = URL_SAFE.decode(payload.trim()).map_err(|e| {
            debug!(error = %e, "decrypt rejected: payload is not url-safe base64");
            SentinelError::Decryption
        })?;

        if raw.len() < MIN_PAYLOAD_LEN {
            debug!(payload_len = raw.len(), "decrypt rejected: payload too short");
            return Err(SentinelError::Decryption);
        }

        let (version, rest) = raw.split_at(1);
        if version[0] != PAYLOAD_VERSION {
            debug!(version = version[0], "decrypt rejected: unknown payload version");
            return Err(SentinelError::Decryption);
        }

        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| SentinelError::Decryption)?;

        let plaintext = crypto::open(&self.cipher, nonce, version, ciphertext).inspect_err(|_| {
            debug!("decrypt rejected: authentication failed");
        })?;

        String::from_utf8(plaintext).map_err(|_| {
            debug!("decrypt rejected: plaintext is not valid UTF-8");
            SentinelError::Decryption
        })
    }

    /// Non-secret fingerprint of the master key.
    pub fn key_fingerprint(&self) -> String {
        self.key.fingerprint()
    }
}
