//! DuckDB migration store.
//!
//! Keeps one row per migration attempt in the bookkeeping table. The current
//! version is the version of the row with the greatest id, whether that
//! attempt succeeded or failed.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use duckdb::Connection;
use std::path::Path;
use sw_core::config::{is_plain_identifier, DEFAULT_TABLE_NAME};
use sw_core::{
    AttemptStatus, MigrationAttempt, MigrationStore, StoreError, StoreResult, Version,
};

/// DuckDB-backed [`MigrationStore`].
///
/// Single-threaded: one migration run owns the connection at a time.
pub struct DuckDbStore {
    conn: Connection,
    table: String,
}

impl DuckDbStore {
    /// Create a new in-memory DuckDB store using the default table name
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::with_connection(conn, DEFAULT_TABLE_NAME)
    }

    /// Open (or create) a DuckDB database file
    pub fn from_path(path: &Path, table: &str) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::with_connection(conn, table)
    }

    /// Create from path string (handles :memory: special case)
    pub fn open(path: &str, table: &str) -> DbResult<Self> {
        if path == ":memory:" {
            let conn = Connection::open_in_memory()
                .map_err(|e| DbError::ConnectionError(e.to_string()))?;
            Self::with_connection(conn, table)
        } else {
            Self::from_path(Path::new(path), table)
        }
    }

    /// Wrap an existing connection, bookkeeping in `table`
    pub fn with_connection(conn: Connection, table: &str) -> DbResult<Self> {
        if !is_plain_identifier(table) {
            return Err(DbError::InvalidTableName(table.to_string()));
        }
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Bookkeeping table name
    pub fn table(&self) -> &str {
        &self.table
    }

    fn not_initialized(&self) -> StoreError {
        StoreError::NotInitialized {
            table: self.table.clone(),
        }
    }

    fn table_exists(&self) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'main' AND table_name = ?",
            duckdb::params![self.table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    fn transaction<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = body(&self.conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(DbError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
        }
        result
    }

    /// Insert an in-progress attempt row and return its id.
    fn start_attempt(&self, version: &Version) -> DbResult<i64> {
        let id: i64 = self.conn.query_row(
            &format!("SELECT nextval('{}_id_seq')", self.table),
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            &format!("INSERT INTO {} (id, version) VALUES (?, ?)", self.table),
            duckdb::params![id, version.as_str()],
        )?;
        Ok(id)
    }

    fn finish_attempt(&self, id: i64, status: AttemptStatus) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "UPDATE {} SET migration_status = ?, last_updated = now() WHERE id = ?",
                self.table
            ),
            duckdb::params![status.as_str(), id],
        )?;
        Ok(())
    }
}

/// True when any statement in `script` is transaction control (`BEGIN`,
/// `COMMIT`, ...). DuckDB rejects a nested `BEGIN`, so such scripts run
/// without the store's own transaction.
fn manages_own_transaction(script: &str) -> bool {
    script.split(';').any(|statement| {
        let keyword = statement
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("--"))
            .flat_map(str::split_whitespace)
            .next()
            .map(str::to_ascii_uppercase);
        matches!(
            keyword.as_deref(),
            Some("BEGIN" | "START" | "COMMIT" | "END" | "ROLLBACK" | "ABORT")
        )
    })
}

impl MigrationStore for DuckDbStore {
    fn initialize(&self) -> StoreResult<()> {
        let table = &self.table;
        self.transaction(|conn| {
            conn.execute_batch(&format!(
                "CREATE SEQUENCE IF NOT EXISTS {table}_id_seq START 1;
                 CREATE TABLE IF NOT EXISTS {table} (
                     id               BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq'),
                     version          VARCHAR NOT NULL,
                     migration_status VARCHAR NOT NULL DEFAULT 'in progress',
                     last_updated     TIMESTAMP NOT NULL DEFAULT now()
                 );"
            ))?;

            let rows: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
            if rows == 0 {
                log::debug!("Seeding {table} with sentinel version");
                conn.execute(
                    &format!("INSERT INTO {table} (version, migration_status) VALUES (?, ?)"),
                    duckdb::params![
                        Version::sentinel().as_str(),
                        AttemptStatus::Success.as_str()
                    ],
                )?;
            }
            Ok(())
        })?;
        Ok(())
    }

    fn current_version(&self) -> StoreResult<Version> {
        if !self.table_exists()? {
            return Err(self.not_initialized());
        }

        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT version FROM {} ORDER BY id DESC LIMIT 1",
                self.table
            ))
            .map_err(DbError::from)?;
        let versions: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .map_err(DbError::from)?
            .collect::<Result<_, _>>()
            .map_err(DbError::from)?;

        versions
            .into_iter()
            .next()
            .map(Version::new)
            .ok_or_else(|| StoreError::NoCurrentVersion {
                table: self.table.clone(),
            })
    }

    fn apply_step(&self, version: &Version, script: &str) -> StoreResult<()> {
        if !self.table_exists()? {
            return Err(self.not_initialized());
        }

        let id = self.start_attempt(version)?;
        log::debug!("Recorded attempt {id} for version {version}");

        let outcome = if manages_own_transaction(script) {
            log::debug!("Script for version {version} controls its own transaction");
            self.conn.execute_batch(script).map_err(|e| {
                // Fails harmlessly when the script never opened a transaction
                let _ = self.conn.execute_batch("ROLLBACK");
                DbError::from(e)
            })
        } else {
            self.transaction(|conn| Ok(conn.execute_batch(script)?))
        };

        match outcome {
            Ok(()) => {
                self.finish_attempt(id, AttemptStatus::Success)?;
                Ok(())
            }
            Err(e) => {
                self.finish_attempt(id, AttemptStatus::Failure)?;
                Err(StoreError::ScriptFailed {
                    version: version.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn history(&self) -> StoreResult<Vec<MigrationAttempt>> {
        if !self.table_exists()? {
            return Err(self.not_initialized());
        }

        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, version, migration_status, epoch_ms(last_updated) FROM {} ORDER BY id",
                self.table
            ))
            .map_err(DbError::from)?;
        let rows = stmt
            .query_map([], |row| {
                let status: String = row.get(2)?;
                let millis: i64 = row.get(3)?;
                Ok(MigrationAttempt {
                    id: row.get(0)?,
                    version: Version::new(row.get::<_, String>(1)?),
                    status: AttemptStatus::from_stored(&status),
                    last_updated: DateTime::<Utc>::from_timestamp_millis(millis)
                        .unwrap_or_default(),
                })
            })
            .map_err(DbError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::from)?;
        Ok(rows)
    }

    fn store_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
