//! Namespaces partitioning the TTL cache.
use std::borrow::Cow;

use thiserror::Error;

/// Prefix under which a group of cache entries is stored.
///
/// Entries are stored as `<namespace>:<key>`, so a namespace may not contain
/// the separator itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheNamespace(Cow<'static, str>);

impl CacheNamespace {
    /// Company job listings.
    pub const JOBS: Self = Self(Cow::Borrowed("jobs"));
    /// Search history.
    pub const SEARCH: Self = Self(Cow::Borrowed("search"));
    /// Cached GET response bodies.
    pub const API: Self = Self(Cow::Borrowed("api-cache"));

    /// Construct a namespace after validating it.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheNamespaceValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheNamespaceValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheNamespaceValidationError::ContainsWhitespace);
        }
        if raw.contains(SEPARATOR) {
            return Err(CacheNamespaceValidationError::ContainsSeparator);
        }
        Ok(Self(Cow::Owned(raw)))
    }

    /// Borrow the namespace as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn entry_key(&self, key: &str) -> String {
        format!("{}{SEPARATOR}{key}", self.0)
    }

    pub(crate) fn prefix(&self) -> String {
        format!("{}{SEPARATOR}", self.0)
    }
}

const SEPARATOR: char = ':';

impl std::fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors returned when constructing [`CacheNamespace`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheNamespaceValidationError {
    /// Namespace is empty after trimming whitespace.
    #[error("cache namespace must not be empty")]
    Empty,
    /// Namespace has leading or trailing whitespace.
    #[error("cache namespace must not contain surrounding whitespace")]
    ContainsWhitespace,
    /// Namespace contains the `:` separator.
    #[error("cache namespace must not contain ':'")]
    ContainsSeparator,
}
