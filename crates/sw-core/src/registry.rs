//! In-memory registry of schema versions.
//!
//! The registry keeps an ascending list of version identifiers alongside a
//! lookup table from identifier to [`SchemaVersion`]. Both are mutated only
//! by [`VersionRegistry::register`], which keeps them in agreement.

use crate::definition::Direction;
use crate::error::{CoreError, CoreResult};
use crate::version::Version;
use std::collections::HashMap;

/// One schema revision with its up- and down-scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersion {
    pub version: Version,
    pub up_script: Option<String>,
    pub down_script: Option<String>,
}

impl SchemaVersion {
    /// Create a version with no scripts registered yet.
    pub fn new(version: Version) -> Self {
        Self {
            version,
            up_script: None,
            down_script: None,
        }
    }

    /// Set the script for `direction`, replacing any previous one.
    pub fn set_script(&mut self, direction: Direction, script: impl Into<String>) {
        let slot = match direction {
            Direction::Up => &mut self.up_script,
            Direction::Down => &mut self.down_script,
        };
        *slot = Some(script.into());
    }

    /// Script registered for `direction`, if any.
    pub fn script(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Up => self.up_script.as_deref(),
            Direction::Down => self.down_script.as_deref(),
        }
    }
}

/// Ordered collection of schema versions.
#[derive(Debug, Default)]
pub struct VersionRegistry {
    ordered: Vec<Version>,
    versions: HashMap<Version, SchemaVersion>,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `script` as the `direction` script of `version`.
    ///
    /// Unknown versions are inserted at their sorted position. Registering
    /// the same version and direction again overwrites the earlier script.
    pub fn register(&mut self, version: Version, direction: Direction, script: impl Into<String>) {
        if let Err(pos) = self.ordered.binary_search(&version) {
            self.ordered.insert(pos, version.clone());
        }
        self.versions
            .entry(version)
            .or_insert_with_key(|v| SchemaVersion::new(v.clone()))
            .set_script(direction, script);
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    /// Position of `version` in ascending order.
    pub fn index_of(&self, version: &str) -> CoreResult<usize> {
        self.ordered
            .binary_search_by(|v| v.as_str().cmp(version))
            .map_err(|_| CoreError::UnknownVersion {
                version: version.to_string(),
            })
    }

    /// Schema version at `index` in ascending order.
    pub fn at(&self, index: usize) -> Option<&SchemaVersion> {
        self.ordered
            .get(index)
            .and_then(|v| self.versions.get(v.as_str()))
    }

    pub fn get(&self, version: &str) -> Option<&SchemaVersion> {
        self.versions.get(version)
    }

    pub fn lowest(&self) -> CoreResult<&Version> {
        self.ordered.first().ok_or(CoreError::EmptyRegistry)
    }

    pub fn highest(&self) -> CoreResult<&Version> {
        self.ordered.last().ok_or(CoreError::EmptyRegistry)
    }

    /// Version identifiers in ascending order.
    pub fn versions(&self) -> &[Version] {
        &self.ordered
    }

    /// Schema versions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaVersion> {
        self.ordered
            .iter()
            .filter_map(|v| self.versions.get(v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
