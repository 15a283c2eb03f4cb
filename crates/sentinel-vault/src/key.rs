// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master key material: 32 random bytes, url-safe base64 on the outside.
//!
//! The text form matches legacy Fernet keys, so a `SENTINEL_MASTER_KEY`
//! generated for the old service decodes to a valid key here.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use sentinel_core::SentinelError;
use zeroize::Zeroizing;

/// Length of the master key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Accepts both padded and unpadded url-safe input.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The vault's master symmetric key.
///
/// Zeroed on drop. Not `Clone`: each vault owns its key exclusively.
pub struct KeyMaterial {
    bytes: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl KeyMaterial {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Decode a url-safe base64 key (padding optional, surrounding whitespace ignored).
    ///
    /// An empty value is [`SentinelError::MissingKey`]; anything that does not
    /// decode to exactly 32 bytes is [`SentinelError::InvalidKey`]. Neither
    /// error echoes the input.
    pub fn from_encoded(encoded: &str) -> Result<Self, SentinelError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(SentinelError::MissingKey {
                name: "vault.master_key",
            });
        }

        let decoded = Zeroizing::new(KEY_ENGINE.decode(encoded).map_err(|_| {
            SentinelError::InvalidKey("master key is not valid url-safe base64".to_string())
        })?);

        let bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            SentinelError::InvalidKey(format!(
                "master key must decode to {KEY_LEN} bytes, got {}",
                decoded.len()
            ))
        })?;

        Ok(Self::from_bytes(bytes))
    }

    /// Generate a fresh random key from the system CSPRNG.
    pub fn generate() -> Result<Self, SentinelError> {
        let mut bytes = [0u8; KEY_LEN];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| SentinelError::Encryption("failed to generate random key".to_string()))?;
        let key = Self::from_bytes(bytes);
        zeroize::Zeroize::zeroize(&mut bytes);
        Ok(key)
    }

    /// Padded url-safe base64, the form stored in configuration.
    pub fn to_encoded(&self) -> String {
        base64::engine::general_purpose::URL_SAFE.encode(self.bytes.as_slice())
    }

    /// Short non-secret identifier: first 8 bytes of SHA-256(key), hex.
    ///
    /// Lets operators confirm two deployments share a key without revealing it.
    pub fn fingerprint(&self) -> String {
        let digest = digest::digest(&digest::SHA256, self.bytes.as_slice());
        hex::encode(&digest.as_ref()[..8])
    }

    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
