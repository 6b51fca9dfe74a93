//! Strongly-typed schema version identifier.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Reserved identifier meaning "no migrations applied".
pub const SENTINEL_VERSION: &str = "000";

/// Opaque, ordered schema version identifier.
///
/// Versions compare as plain strings, so identifiers must be zero-padded to
/// a fixed width (`"001"`, `"002"`, ..., `"010"`) for lexicographic order to
/// agree with numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new `Version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The sentinel version recorded by a freshly initialized store.
    pub fn sentinel() -> Self {
        Self(SENTINEL_VERSION.to_string())
    }

    /// Returns true if this is the sentinel version.
    pub fn is_sentinel(&self) -> bool {
        self.0 == SENTINEL_VERSION
    }

    /// Return the underlying identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Version {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Version {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
