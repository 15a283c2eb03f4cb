// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] draws a fresh random 96-bit nonce from the supplied
//! CSPRNG. Nonce reuse under one key would be catastrophic for GCM.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::SecureRandom;
use sentinel_core::SentinelError;

use crate::key::KeyMaterial;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Expand key material into a ready-to-use AES-256-GCM key.
pub fn cipher_for(key: &KeyMaterial) -> Result<LessSafeKey, SentinelError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.expose())
        .map_err(|_| SentinelError::InvalidKey("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext`, binding `aad`, under a random nonce.
///
/// Returns `(nonce, ciphertext_with_tag)`.
pub fn seal(
    cipher: &LessSafeKey,
    rng: &dyn SecureRandom,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<([u8; NONCE_LEN], Vec<u8>), SentinelError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| SentinelError::Encryption("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    cipher
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(aad),
            &mut in_out,
        )
        .map_err(|_| SentinelError::Encryption("AES-256-GCM seal failed".to_string()))?;

    Ok((nonce_bytes, in_out))
}

/// Decrypt and authenticate `ciphertext` (which carries its trailing tag).
///
/// Wrong key, wrong `aad` and tampered bytes are indistinguishable:
/// all return [`SentinelError::Decryption`].
pub fn open(
    cipher: &LessSafeKey,
    nonce_bytes: [u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, SentinelError> {
    let mut in_out = ciphertext.to_vec();
    let plaintext = cipher
        .open_in_place(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(aad),
            &mut in_out,
        )
        .map_err(|_| SentinelError::Decryption)?;
    Ok(plaintext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::rand::SystemRandom;

    fn test_cipher() -> LessSafeKey {
        cipher_for(&KeyMaterial::generate().unwrap()).unwrap()
    }

    #[test]
    fn seal_open_roundtrip() {
        let cipher = test_cipher();
        let rng = SystemRandom::new();

        let (nonce, ciphertext) = seal(&cipher, &rng, b"v1", b"db password").unwrap();
        let plaintext = open(&cipher, nonce, b"v1", &ciphertext).unwrap();

        assert_eq!(plaintext, b"db password");
    }

    #[test]
    fn ciphertext_carries_tag() {
        let cipher = test_cipher();
        let (_, ciphertext) = seal(&cipher, &SystemRandom::new(), b"", b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + TAG_LEN);
    }

    #[test]
    fn nonces_are_fresh_per_call() {
        let cipher = test_cipher();
        let rng = SystemRandom::new();
        let (n1, c1) = seal(&cipher, &rng, b"", b"same").unwrap();
        let (n2, c2) = seal(&cipher, &rng, b"", b"same").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn mismatched_aad_fails() {
        let cipher = test_cipher();
        let (nonce, ciphertext) = seal(&cipher, &SystemRandom::new(), b"v1", b"x").unwrap();
        let err = open(&cipher, nonce, b"v2", &ciphertext).unwrap_err();
        assert!(matches!(err, SentinelError::Decryption));
    }

    #[test]
    fn wrong_key_fails() {
        let (nonce, ciphertext) =
            seal(&test_cipher(), &SystemRandom::new(), b"", b"secret").unwrap();
        assert!(open(&test_cipher(), nonce, b"", &ciphertext).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let cipher = test_cipher();
        let (nonce, mut ciphertext) = seal(&cipher, &SystemRandom::new(), b"", b"x").unwrap();
        ciphertext[0] ^= 0x01;
        assert!(open(&cipher, nonce, b"", &ciphertext).is_err());
    }
}
