// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User store trait for credential persistence backends.

use std::sync::Arc;

use crate::error::SentinelError;
use crate::types::Credential;

/// Persistence backend for registered credentials.
///
/// The persistence format is the implementation's concern. Implementations
/// must make [`put`](UserStore::put) an atomic check-then-insert: two
/// concurrent puts for the same username must yield exactly one success.
pub trait UserStore: Send + Sync {
    /// Look up a credential by exact (case-sensitive) username.
    fn get(&self, username: &str) -> Result<Option<Credential>, SentinelError>;

    /// Insert a new credential.
    ///
    /// Returns [`SentinelError::DuplicateUser`] if the username already exists.
    fn put(&self, credential: Credential) -> Result<(), SentinelError>;
}

impl<S: UserStore + ?Sized> UserStore for Arc<S> {
    fn get(&self, username: &str) -> Result<Option<Credential>, SentinelError> {
        (**self).get(username)
    }

    fn put(&self, credential: Credential) -> Result<(), SentinelError> {
        (**self).put(credential)
    }
}
