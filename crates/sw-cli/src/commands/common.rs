//! Shared utilities for CLI commands

use anyhow::Result;
use sw_core::{
    CoreError, Direction, ErrorCategory, MigrationManager, MigrationStore, StoreError, Version,
};
use sw_db::DbError;

/// Unclassified failure. Code 2 is left to clap usage errors.
pub(crate) const EXIT_FAILURE: i32 = 1;
/// Configuration could not be loaded or is invalid
pub(crate) const EXIT_CONFIG: i32 = 3;
/// Filesystem error
pub(crate) const EXIT_IO: i32 = 4;
/// Malformed migration file
pub(crate) const EXIT_DEFINITION: i32 = 5;
/// Database or bookkeeping table error, including failed scripts
pub(crate) const EXIT_STORE: i32 = 6;
/// No route from the current version to the requested one
pub(crate) const EXIT_MIGRATION: i32 = 7;

/// Map an error to the process exit code for its failure category.
///
/// The first recognized error in the cause chain decides.
pub(crate) fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            return category_exit_code(core.category());
        }
        if cause.is::<StoreError>() || cause.is::<DbError>() {
            return EXIT_STORE;
        }
        if cause.is::<std::io::Error>() {
            return EXIT_IO;
        }
    }
    EXIT_FAILURE
}

fn category_exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Config => EXIT_CONFIG,
        ErrorCategory::Io => EXIT_IO,
        ErrorCategory::Definition => EXIT_DEFINITION,
        ErrorCategory::Store => EXIT_STORE,
        ErrorCategory::Migration => EXIT_MIGRATION,
    }
}

/// Target for `up`/`down`: the explicit version, or the highest (up) or
/// lowest (down) registered version. `None` when nothing is registered.
pub(crate) fn resolve_target<S: MigrationStore + ?Sized>(
    manager: &MigrationManager<'_, S>,
    explicit: Option<&str>,
    direction: Direction,
) -> Result<Option<Version>> {
    if let Some(version) = explicit {
        return Ok(Some(Version::from(version)));
    }
    if manager.registered_versions().is_empty() {
        return Ok(None);
    }
    let bound = match direction {
        Direction::Up => manager.highest_available()?,
        Direction::Down => manager.lowest_available()?,
    };
    Ok(Some(bound))
}

/// Print a table with column headers, separator, and rows.
///
/// Column widths are calculated from the maximum of header and cell widths.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
