//! sw-core - Core library for Stepwise
//!
//! This crate provides the migration definition parser, the ordered version
//! registry, the migration store contract, and the [`MigrationManager`] that
//! walks a database schema up or down one recorded step at a time.

pub mod config;
pub mod definition;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod store;
pub mod version;

pub use config::{Config, DatabaseConfig};
pub use definition::{parse_definition, Direction, MigrationDefinition};
pub use discovery::discover_definitions;
pub use error::{CoreError, CoreResult, ErrorCategory};
pub use logging::{LogFacade, MigrationLog};
pub use manager::{MigrationManager, MigrationReport, Step};
pub use registry::{SchemaVersion, VersionRegistry};
pub use store::{
    AttemptStatus, MemoryStore, MigrationAttempt, MigrationStore, StoreError, StoreResult,
};
pub use version::{Version, SENTINEL_VERSION};
