// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM secret vault for the SentinelCloud credential service.
//!
//! Encrypts short text secrets (database passwords, API keys) under a single
//! 32-byte master key and returns an opaque url-safe payload. Payloads carry
//! a fresh random nonce and an authentication tag, so any modification is
//! detected on decrypt.

pub mod crypto;
pub mod key;
pub mod vault;

pub use key::{KeyMaterial, KEY_LEN};
pub use vault::{SecretVault, ALGORITHM};
