// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`UserStore`] backends.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sentinel_core::{Credential, SentinelError, UserStore};
use tracing::{debug, info};

/// In-process store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, Credential>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserStore for MemoryUserStore {
    fn get(&self, username: &str) -> Result<Option<Credential>, SentinelError> {
        Ok(self.users.get(username).map(|entry| entry.value().clone()))
    }

    fn put(&self, credential: Credential) -> Result<(), SentinelError> {
        match self.users.entry(credential.username.clone()) {
            Entry::Occupied(_) => Err(SentinelError::DuplicateUser {
                username: credential.username,
            }),
            Entry::Vacant(slot) => {
                slot.insert(credential);
                Ok(())
            }
        }
    }
}

/// Store backed by a JSON object (`username -> credential`) on disk.
///
/// The whole map is held in memory behind a mutex. Every insert rewrites the
/// file through a temporary sibling that is renamed into place, so readers
/// never observe a half-written file.
#[derive(Debug)]
pub struct JsonFileUserStore {
    path: PathBuf,
    users: Mutex<BTreeMap<String, Credential>>,
}

impl JsonFileUserStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SentinelError> {
        let path = path.into();
        let users = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(SentinelError::storage)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(SentinelError::storage(e)),
        };
        info!(path = %path.display(), users = users.len(), "user store opened");
        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    fn persist(&self, users: &BTreeMap<String, Credential>) -> Result<(), SentinelError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(SentinelError::storage)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(SentinelError::storage)?;
        serde_json::to_writer_pretty(&mut tmp, users).map_err(SentinelError::storage)?;
        tmp.write_all(b"\n").map_err(SentinelError::storage)?;
        tmp.as_file().sync_all().map_err(SentinelError::storage)?;
        tmp.persist(&self.path)
            .map_err(|e| SentinelError::storage(e.error))?;
        debug!(path = %self.path.display(), users = users.len(), "user store persisted");
        Ok(())
    }
}

impl UserStore for JsonFileUserStore {
    fn get(&self, username: &str) -> Result<Option<Credential>, SentinelError> {
        let users = self
            .users
            .lock()
            .map_err(|_| SentinelError::Internal("user store lock poisoned".to_string()))?;
        Ok(users.get(username).cloned())
    }

    fn put(&self, credential: Credential) -> Result<(), SentinelError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| SentinelError::Internal("user store lock poisoned".to_string()))?;
        if users.contains_key(&credential.username) {
            return Err(SentinelError::DuplicateUser {
                username: credential.username,
            });
        }

        let username = credential.username.clone();
        users.insert(username.clone(), credential);
        if let Err(e) = self.persist(&users) {
            users.remove(&username);
            return Err(e);
        }
        Ok(())
    }
}
