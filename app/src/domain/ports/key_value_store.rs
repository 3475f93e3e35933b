//! Port for the local persistent key-value store.
//!
//! The store holds plain strings. Namespacing, expiry and JSON envelopes are
//! layered on top by [`crate::domain::TtlCache`] and
//! [`crate::domain::SessionStore`].

use super::define_port_error;

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum KeyValueStoreError {
        /// Reading or writing the backing medium failed.
        Io { message: String } => "key-value store I/O failed: {message}",
        /// The backing medium holds data that cannot be decoded.
        Corrupt { message: String } => "key-value store contents are corrupt: {message}",
    }
}

/// Synchronous string key-value store.
///
/// Writes are last-writer-wins; adapters provide no cross-key atomicity.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), KeyValueStoreError>;

    /// List every stored key.
    fn keys(&self) -> Result<Vec<String>, KeyValueStoreError>;

    /// Delete every key.
    fn clear(&self) -> Result<(), KeyValueStoreError>;
}
