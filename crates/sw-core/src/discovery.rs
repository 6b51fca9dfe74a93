//! Discovery of migration definition files on disk.

use crate::definition::{parse_definition, MigrationDefinition, MIGRATION_FILE_EXTENSION};
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Read and parse every `.sql` file directly inside `dir`.
///
/// Files with other extensions are skipped. Files are read in name order and
/// the first malformed `.sql` name aborts the whole batch.
pub fn discover_definitions(dir: &Path) -> CoreResult<Vec<MigrationDefinition>> {
    let io_err = |path: &Path, source: std::io::Error| CoreError::IoWithPath {
        path: path.display().to_string(),
        source,
    };

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| io_err(dir, e)))
        .collect::<CoreResult<_>>()?;
    paths.retain(|p| {
        p.is_file()
            && p
                .extension()
                .is_some_and(|e| e == MIGRATION_FILE_EXTENSION)
    });
    paths.sort();

    let mut definitions = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
        log::debug!("Parsing migration file {}", path.display());
        definitions.push(parse_definition(&name, &content)?);
    }

    Ok(definitions)
}
