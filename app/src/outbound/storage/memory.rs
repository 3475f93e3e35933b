//! Process-local key-value store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// In-memory [`KeyValueStore`] backed by an ordered map.
///
/// Nothing survives the process; useful for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, KeyValueStoreError> {
        self.entries
            .lock()
            .map_err(|_| KeyValueStoreError::io("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, KeyValueStoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), KeyValueStoreError> {
        self.lock()?.clear();
        Ok(())
    }
}
