//! Namespaced TTL cache over the local key-value store.
//!
//! Each entry is stored as a JSON envelope `{"value": ..., "expiry": ms}`
//! under `<namespace>:<key>`. Reads past expiry delete the entry and report
//! it absent. Unparsable entries read as absent and are left in place.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

mod namespace;

pub use namespace::{CacheNamespace, CacheNamespaceValidationError};

/// Lifetime applied when callers do not choose one.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Errors raised by [`TtlCache`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] KeyValueStoreError),
    /// The value could not be encoded as JSON.
    #[error("failed to serialise cached value: {message}")]
    Serialization {
        /// Encoder message.
        message: String,
    },
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    value: &'a T,
    expiry: i64,
}

#[derive(Deserialize)]
struct Envelope {
    value: Value,
    expiry: i64,
}

/// Expiring cache partitioned by [`CacheNamespace`].
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    /// Build a cache over `store`, reading time from `clock`.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Store `value` until `ttl` has elapsed, replacing any existing entry.
    pub fn set<T: Serialize>(
        &self,
        namespace: &CacheNamespace,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let envelope = EnvelopeRef {
            value,
            expiry: self.now_millis().saturating_add(duration_millis(ttl)),
        };
        let encoded = serde_json::to_string(&envelope).map_err(|err| CacheError::Serialization {
            message: err.to_string(),
        })?;
        self.store.set(&namespace.entry_key(key), &encoded)?;
        Ok(())
    }

    /// Store `value` for [`DEFAULT_CACHE_TTL`].
    pub fn set_default<T: Serialize>(
        &self,
        namespace: &CacheNamespace,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        self.set(namespace, key, value, DEFAULT_CACHE_TTL)
    }

    /// Read a live entry.
    ///
    /// Expired entries are deleted. Entries that fail to decode as `T` read
    /// as absent.
    pub fn get<T: DeserializeOwned>(
        &self,
        namespace: &CacheNamespace,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        let entry_key = namespace.entry_key(key);
        let Some(envelope) = self.read_envelope(&entry_key)? else {
            return Ok(None);
        };
        if envelope.expiry < self.now_millis() {
            debug!(key = %entry_key, "cache entry expired");
            self.store.remove(&entry_key)?;
            return Ok(None);
        }
        Ok(serde_json::from_value(envelope.value).ok())
    }

    /// Returns `true` when the entry is missing, unreadable or past expiry.
    pub fn has_expired(&self, namespace: &CacheNamespace, key: &str) -> Result<bool, CacheError> {
        let envelope = self.read_envelope(&namespace.entry_key(key))?;
        Ok(envelope.is_none_or(|item| item.expiry < self.now_millis()))
    }

    /// Delete one entry.
    pub fn remove(&self, namespace: &CacheNamespace, key: &str) -> Result<(), CacheError> {
        self.store.remove(&namespace.entry_key(key))?;
        Ok(())
    }

    /// Delete every entry in `namespace`, returning how many were removed.
    pub fn clear_namespace(&self, namespace: &CacheNamespace) -> Result<usize, CacheError> {
        let prefix = namespace.prefix();
        let mut removed = 0;
        for key in self.store.keys()? {
            if key.starts_with(&prefix) {
                self.store.remove(&key)?;
                removed += 1;
            }
        }
        debug!(namespace = %namespace, removed, "cleared cache namespace");
        Ok(removed)
    }

    /// Delete everything in the underlying store, namespaced or not.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.store.clear()?;
        Ok(())
    }

    fn read_envelope(&self, entry_key: &str) -> Result<Option<Envelope>, CacheError> {
        let Some(raw) = self.store.get(entry_key)? else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    fn now_millis(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
