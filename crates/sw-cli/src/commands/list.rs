//! List command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sw_core::{Direction, MigrationStore, SchemaVersion, StoreError, Version};

use crate::cli::{GlobalArgs, ListArgs, OutputFormat};
use crate::commands::common::print_table;
use crate::context::RuntimeContext;

/// One registered version as shown by `sw list`
#[derive(Debug, Serialize)]
struct VersionInfo {
    version: Version,
    up: bool,
    down: bool,
    current: bool,
}

impl VersionInfo {
    fn new(schema: &SchemaVersion, current: Option<&Version>) -> Self {
        Self {
            version: schema.version.clone(),
            up: schema.script(Direction::Up).is_some(),
            down: schema.script(Direction::Down).is_some(),
            current: current == Some(&schema.version),
        }
    }
}

/// Execute the list command
pub(crate) fn execute(args: &ListArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let manager = ctx.manager()?;

    // Listing does not require an initialized database
    let current = match ctx.store.current_version() {
        Ok(version) => Some(version),
        Err(StoreError::NotInitialized { .. }) => None,
        Err(e) => return Err(e).context("Failed to read current version"),
    };

    let infos: Vec<VersionInfo> = manager
        .registry()
        .iter()
        .map(|schema| VersionInfo::new(schema, current.as_ref()))
        .collect();

    match args.output {
        OutputFormat::Table => print_versions(&infos, current.as_ref()),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&infos).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn print_versions(infos: &[VersionInfo], current: Option<&Version>) {
    if infos.is_empty() {
        println!("No migrations found.");
        return;
    }

    let mark = |present: bool| (if present { "yes" } else { "-" }).to_string();
    let rows: Vec<Vec<String>> = infos
        .iter()
        .map(|info| {
            vec![
                info.version.to_string(),
                mark(info.up),
                mark(info.down),
                (if info.current { "*" } else { "" }).to_string(),
            ]
        })
        .collect();
    print_table(&["VERSION", "UP", "DOWN", "CURRENT"], &rows);

    println!();
    match current {
        Some(version) => println!("{} version(s), current: {version}", infos.len()),
        None => println!("{} version(s), database not initialized", infos.len()),
    }
}
