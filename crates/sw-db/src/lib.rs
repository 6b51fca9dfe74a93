//! sw-db - DuckDB migration store for Stepwise
//!
//! This crate provides [`DuckDbStore`], the [`sw_core::MigrationStore`]
//! implementation that keeps one bookkeeping row per migration attempt.

pub mod error;
pub mod store;

pub use error::{DbError, DbResult};
pub use store::DuckDbStore;
