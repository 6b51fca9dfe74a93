//! Version command implementation

use anyhow::{Context, Result};
use sw_core::MigrationStore;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Print the current schema version
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let current = ctx
        .store
        .current_version()
        .context("Failed to read current version")?;
    println!("{current}");
    Ok(())
}
