//! Init command implementation - creates the bookkeeping table

use anyhow::{Context, Result};
use sw_core::MigrationManager;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the init command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    // Registration is not needed to create the table, and the migrations
    // directory may not exist yet.
    let manager = MigrationManager::new(&ctx.store);
    manager
        .initialize_database()
        .context("Failed to initialize migration table")?;

    let current = manager.current_version()?;
    println!(
        "Initialized {} in {} (current version: {current})",
        ctx.config.table, ctx.database
    );
    Ok(())
}
