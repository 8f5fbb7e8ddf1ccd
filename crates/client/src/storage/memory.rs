use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{KeyValueStorage, StorageError};

/// In-memory storage for tests/dev.
///
/// Clones share the same map, so a clone handed to a second session context
/// behaves like the same storage area seen after a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().map_err(|_| StorageError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| StorageError::Poisoned)?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
