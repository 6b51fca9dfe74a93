//! History command implementation

use anyhow::{Context, Result};
use sw_core::MigrationStore;

use crate::cli::{GlobalArgs, HistoryArgs, OutputFormat};
use crate::commands::common::print_table;
use crate::context::RuntimeContext;

/// Execute the history command
pub(crate) fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let attempts = ctx
        .store
        .history()
        .context("Failed to read migration history")?;

    match args.output {
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = attempts
                .iter()
                .map(|a| {
                    vec![
                        a.id.to_string(),
                        a.version.to_string(),
                        a.status.to_string(),
                        a.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ]
                })
                .collect();
            print_table(&["ID", "VERSION", "STATUS", "LAST UPDATED"], &rows);
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&attempts).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
    }
    Ok(())
}
