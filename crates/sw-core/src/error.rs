//! Error types for sw-core

use crate::definition::Direction;
use crate::store::StoreError;
use thiserror::Error;

/// Core error type for Stepwise
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Config YAML parse error
    #[error("[C003] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// IO error with file path context
    #[error("[C004] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// M001: Migration definition name or content is malformed
    #[error("[M001] Invalid migration definition '{name}': {reason}")]
    InvalidDefinitionFormat { name: String, reason: String },

    /// M002: Direction other than `up` or `down`
    #[error("[M002] Migration action must be either 'up' or 'down', found '{action}'")]
    InvalidAction { action: String },

    /// M003: Version was never registered
    #[error("[M003] Schema version '{version}' has not been registered")]
    UnknownVersion { version: String },

    /// M004: No versions registered at all
    #[error("[M004] No schema versions have been registered")]
    EmptyRegistry,

    /// M005: Boundary reached or target unreachable
    #[error("[M005] Schema version '{version}' has no further {direction} step")]
    NoNextStep { version: String, direction: Direction },

    /// M006: The step needs a script that was never registered
    #[error("[M006] Schema version '{version}' has no {direction} script")]
    MissingScript { version: String, direction: Direction },

    /// Migration store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Broad failure category, used by the command surface to pick exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Io,
    Definition,
    Store,
    Migration,
}

impl CoreError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::ConfigNotFound { .. }
            | CoreError::ConfigInvalid { .. }
            | CoreError::YamlParse(_) => ErrorCategory::Config,
            CoreError::IoWithPath { .. } => ErrorCategory::Io,
            CoreError::InvalidDefinitionFormat { .. } | CoreError::InvalidAction { .. } => {
                ErrorCategory::Definition
            }
            CoreError::UnknownVersion { .. }
            | CoreError::EmptyRegistry
            | CoreError::NoNextStep { .. }
            | CoreError::MissingScript { .. } => ErrorCategory::Migration,
            CoreError::Store(_) => ErrorCategory::Store,
        }
    }
}
