//! Migration definition parsing.
//!
//! A definition is one `<version>.<direction>.sql` unit: the file name says
//! which version it belongs to and which way it moves the schema, the
//! content is the raw change script.

use crate::error::{CoreError, CoreResult};
use crate::version::{Version, SENTINEL_VERSION};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// File extension recognized for migration definitions.
pub const MIGRATION_FILE_EXTENSION: &str = "sql";

/// Which way a script moves the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(CoreError::InvalidAction {
                action: other.to_string(),
            }),
        }
    }
}

/// A parsed migration definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDefinition {
    /// Version this script belongs to
    pub version: Version,
    /// Direction the script moves the schema
    pub direction: Direction,
    /// Raw change script, unmodified
    pub script: String,
}

/// Parse a definition from its name and raw content.
///
/// The name must be exactly `<version>.<up|down>.sql`. The version is taken
/// verbatim and the content must be valid UTF-8.
pub fn parse_definition(name: &str, content: &[u8]) -> CoreResult<MigrationDefinition> {
    let invalid = |reason: &str| CoreError::InvalidDefinitionFormat {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = name.split('.').collect();
    let [version, action, extension] = fields.as_slice() else {
        return Err(invalid("expected <version>.<up|down>.sql"));
    };

    if *extension != MIGRATION_FILE_EXTENSION {
        return Err(invalid("extension must be 'sql'"));
    }

    let direction = action
        .parse::<Direction>()
        .map_err(|e| invalid(&e.to_string()))?;

    if version.is_empty() {
        return Err(invalid("version must not be empty"));
    }

    if *version == SENTINEL_VERSION {
        return Err(invalid(&format!(
            "version '{SENTINEL_VERSION}' is reserved for the empty schema"
        )));
    }

    let script = std::str::from_utf8(content)
        .map_err(|e| invalid(&format!("content is not valid UTF-8: {e}")))?
        .to_string();

    Ok(MigrationDefinition {
        version: Version::new(*version),
        direction,
        script,
    })
}

#[cfg(test)]
#[path = "definition_test.rs"]
mod tests;
