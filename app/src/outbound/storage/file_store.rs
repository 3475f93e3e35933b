//! Key-value store persisted as one JSON document.
//!
//! The whole map is held in memory and rewritten atomically after every
//! mutation. Stores are small (session values and a few cached lists), so a
//! full rewrite keeps the file format trivial to inspect.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// File-backed [`KeyValueStore`].
pub struct FileKeyValueStore {
    dir: Dir,
    file_name: String,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the store at `path`, creating its parent directory if needed.
    ///
    /// A missing file opens as an empty store. A file that is not a JSON
    /// object of strings is reported as [`KeyValueStoreError::Corrupt`].
    pub fn open(path: &Path) -> Result<Self, KeyValueStoreError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                KeyValueStoreError::io(format!("store path {} has no file name", path.display()))
            })?
            .to_owned();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Dir::create_ambient_dir_all(parent, ambient_authority()).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;

        let entries = match dir.read_to_string(&file_name) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|err| KeyValueStoreError::corrupt(err.to_string()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(io_error(err)),
        };
        debug!(path = %path.display(), "opened key-value store");

        Ok(Self {
            dir,
            file_name,
            entries: Mutex::new(entries),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, KeyValueStoreError> {
        self.entries
            .lock()
            .map_err(|_| KeyValueStoreError::io("file store lock poisoned"))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), KeyValueStoreError> {
        let encoded = serde_json::to_string_pretty(entries)
            .map_err(|err| KeyValueStoreError::io(err.to_string()))?;
        write_atomic(&self.dir, &self.file_name, &encoded).map_err(io_error)
    }

    fn mutate(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), KeyValueStoreError> {
        let mut entries = self.lock()?;
        let mut staged = entries.clone();
        if change(&mut staged) {
            // Memory only moves once the document is on disk.
            self.persist(&staged)?;
            *entries = staged;
        }
        Ok(())
    }
}

fn io_error(err: io::Error) -> KeyValueStoreError {
    KeyValueStoreError::io(err.to_string())
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, KeyValueStoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), KeyValueStoreError> {
        self.mutate(|entries| {
            let had_entries = !entries.is_empty();
            entries.clear();
            had_entries
        })
    }
}
