//! In-memory migration store.

use super::{AttemptStatus, MigrationAttempt, MigrationStore, StoreError, StoreResult};
use crate::version::Version;
use chrono::Utc;
use std::cell::RefCell;
use std::collections::HashSet;

const MEMORY_TABLE: &str = "memory";

/// A [`MigrationStore`] that keeps its bookkeeping in memory.
///
/// Scripts are not interpreted. Every executed `(version, script)` pair is
/// kept so callers can check which scripts ran and in what order, and
/// [`fail_on`](Self::fail_on) makes attempts at a version fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    attempts: RefCell<Option<Vec<MigrationAttempt>>>,
    executed: RefCell<Vec<(Version, String)>>,
    failing: HashSet<Version>,
}

impl MemoryStore {
    /// Create an uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that is already initialized at the sentinel version.
    pub fn initialized() -> Self {
        let store = Self::new();
        store.seed();
        store
    }

    /// Make every attempt at `version` fail.
    pub fn fail_on(mut self, version: impl Into<Version>) -> Self {
        self.failing.insert(version.into());
        self
    }

    /// Executed `(version, script)` pairs in execution order.
    pub fn executed(&self) -> Vec<(Version, String)> {
        self.executed.borrow().clone()
    }

    fn seed(&self) {
        let mut attempts = self.attempts.borrow_mut();
        if attempts.is_none() {
            *attempts = Some(vec![MigrationAttempt {
                id: 1,
                version: Version::sentinel(),
                status: AttemptStatus::Success,
                last_updated: Utc::now(),
            }]);
        }
    }

    fn not_initialized() -> StoreError {
        StoreError::NotInitialized {
            table: MEMORY_TABLE.to_string(),
        }
    }
}

impl MigrationStore for MemoryStore {
    fn initialize(&self) -> StoreResult<()> {
        self.seed();
        Ok(())
    }

    fn current_version(&self) -> StoreResult<Version> {
        let attempts = self.attempts.borrow();
        let attempts = attempts.as_ref().ok_or_else(Self::not_initialized)?;
        attempts
            .last()
            .map(|a| a.version.clone())
            .ok_or_else(|| StoreError::NoCurrentVersion {
                table: MEMORY_TABLE.to_string(),
            })
    }

    fn apply_step(&self, version: &Version, script: &str) -> StoreResult<()> {
        let index = {
            let mut attempts = self.attempts.borrow_mut();
            let attempts = attempts.as_mut().ok_or_else(Self::not_initialized)?;
            let id = attempts.last().map_or(1, |a| a.id + 1);
            attempts.push(MigrationAttempt {
                id,
                version: version.clone(),
                status: AttemptStatus::InProgress,
                last_updated: Utc::now(),
            });
            attempts.len() - 1
        };

        self.executed
            .borrow_mut()
            .push((version.clone(), script.to_string()));
        let failed = self.failing.contains(version);

        let mut attempts = self.attempts.borrow_mut();
        if let Some(attempt) = attempts.as_mut().and_then(|a| a.get_mut(index)) {
            attempt.status = if failed {
                AttemptStatus::Failure
            } else {
                AttemptStatus::Success
            };
            attempt.last_updated = Utc::now();
        }

        if failed {
            return Err(StoreError::ScriptFailed {
                version: version.to_string(),
                message: "configured to fail".to_string(),
            });
        }
        Ok(())
    }

    fn history(&self) -> StoreResult<Vec<MigrationAttempt>> {
        self.attempts
            .borrow()
            .clone()
            .ok_or_else(Self::not_initialized)
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}
