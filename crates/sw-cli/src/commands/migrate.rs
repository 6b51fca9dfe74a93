//! Up and down command implementation

use anyhow::{Context, Result};
use sw_core::Direction;

use crate::cli::GlobalArgs;
use crate::commands::common::resolve_target;
use crate::context::RuntimeContext;

/// Execute `up` or `down` toward `to`, or toward the highest/lowest
/// registered version when `to` is not given.
pub(crate) fn execute(
    global: &GlobalArgs,
    direction: Direction,
    to: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let manager = ctx.manager()?;

    let Some(target) = resolve_target(&manager, to, direction)? else {
        log::info!(
            "No migrations found in {}; nothing to do",
            ctx.migrations_dir.display()
        );
        return Ok(());
    };

    if dry_run {
        let steps = match direction {
            Direction::Up => manager.plan_up(&target),
            Direction::Down => manager.plan_down(&target),
        }
        .with_context(|| format!("Cannot migrate {direction} to version {target}"))?;

        if steps.is_empty() {
            println!("Schema is already at version {target}");
        }
        for step in &steps {
            println!("{}: {} -> {}", step.direction, step.from, step.to);
        }
        return Ok(());
    }

    let report = match direction {
        Direction::Up => manager.up(&target),
        Direction::Down => manager.down(&target),
    }
    .with_context(|| format!("Failed to migrate {direction} to version {target}"))?;

    if report.is_noop() {
        println!("Schema is already at version {}", report.to);
    } else {
        println!(
            "Migrated {} from {} to {} ({} step(s))",
            report.direction,
            report.from,
            report.to,
            report.steps.len()
        );
    }
    Ok(())
}
