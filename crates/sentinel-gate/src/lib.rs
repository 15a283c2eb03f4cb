// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access gate for the SentinelCloud credential service.
//!
//! Composes Argon2id password hashing ([`CredentialHasher`]) and HS256 access
//! tokens ([`TokenIssuer`]) over a pluggable [`UserStore`](sentinel_core::UserStore)
//! into the register/login contract served by the gateway.

pub mod gate;
pub mod hasher;
pub mod store;
pub mod token;

pub use gate::{AccessGate, AccessGrant};
pub use hasher::CredentialHasher;
pub use store::{JsonFileUserStore, MemoryUserStore};
pub use token::{generate_secret, Claims, TokenIssuer, VerifiedToken};
