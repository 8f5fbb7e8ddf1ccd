//! Key-value storage backends for the session store.
//!
//! The session store only ever needs string keys and string values, the same
//! contract a browser storage area offers. Backends must apply `set_all` and
//! `remove_all` as a single step: a reader never observes half of a write or
//! half of a clear.

use std::sync::Arc;

use thiserror::Error;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("failed to start storage runtime: {0}")]
    Runtime(String),
}

impl StorageError {
    pub(crate) fn backend(err: anyhow::Error) -> Self {
        Self::Backend(format!("{err:#}"))
    }
}

/// Synchronous string key-value storage.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry, all or nothing.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove every listed key, all or nothing. Missing keys are ignored.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_all(&[(key, value)])
    }
}

impl<S> KeyValueStorage for Arc<S>
where
    S: KeyValueStorage + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        (**self).set_all(entries)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        (**self).remove_all(keys)
    }
}
