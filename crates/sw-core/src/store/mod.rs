//! Migration store contract.
//!
//! The store owns all durable state: the per-attempt bookkeeping records and,
//! derived from them, the current schema version. The manager re-reads the
//! current version from the store before every step and never caches it.

use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// Errors raised by a [`MigrationStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// S001: Bookkeeping table does not exist yet
    #[error("[S001] Migration table '{table}' could not be found; run `sw init` first")]
    NotInitialized { table: String },

    /// S002: Bookkeeping table exists but holds no attempts
    #[error("[S002] No migrations have been recorded in '{table}'")]
    NoCurrentVersion { table: String },

    /// S003: The change script failed; the attempt was recorded as a failure
    #[error("[S003] Migration script for version '{version}' failed: {message}")]
    ScriptFailed { version: String, message: String },

    /// S004: Underlying database error, propagated opaquely
    #[error("[S004] Migration store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a recorded migration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Success,
    Failure,
}

impl AttemptStatus {
    /// Value stored in the bookkeeping table.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in progress",
            AttemptStatus::Success => "success",
            AttemptStatus::Failure => "failure",
        }
    }

    /// Parse a stored status value. Anything unrecognized counts as in progress.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "success" => AttemptStatus::Success,
            "failure" => AttemptStatus::Failure,
            _ => AttemptStatus::InProgress,
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the bookkeeping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationAttempt {
    pub id: i64,
    pub version: Version,
    pub status: AttemptStatus,
    pub last_updated: DateTime<Utc>,
}

/// Durable record of the current schema version and executor of change scripts.
pub trait MigrationStore {
    /// Ensure the bookkeeping structure exists and seed it with the sentinel
    /// version. Must not reset an already-advanced current version.
    fn initialize(&self) -> StoreResult<()>;

    /// Version of the most recent attempt, successful or not.
    fn current_version(&self) -> StoreResult<Version>;

    /// Record the start of an attempt at `version`, run `script`, then record
    /// success or failure. A failed script is recorded before
    /// [`StoreError::ScriptFailed`] is returned.
    fn apply_step(&self, version: &Version, script: &str) -> StoreResult<()>;

    /// Every recorded attempt, oldest first.
    fn history(&self) -> StoreResult<Vec<MigrationAttempt>>;

    /// Store type identifier for logging
    fn store_type(&self) -> &'static str;
}
