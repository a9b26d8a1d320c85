//! Deterministic cache keys.
//!
//! A key is an operation tag followed by `/`-separated segments. Positional
//! arguments are percent-encoded, so no value can smuggle a separator into the
//! key; optional filters appear as `name=value` only when set.

use std::fmt;

/// Cache key for one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Start a key for the given operation tag.
    pub fn new(tag: &str) -> Self {
        Self(urlencoding::encode(tag).into_owned())
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.0.push('/');
        self.0.push_str(&urlencoding::encode(&value.to_string()));
        self
    }

    /// Append an optional named filter; `None` leaves the key unchanged.
    pub fn filter<V: fmt::Display>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.push('/');
            self.0.push_str(&urlencoding::encode(name));
            self.0.push('=');
            self.0.push_str(&urlencoding::encode(&value.to_string()));
        }
        self
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
