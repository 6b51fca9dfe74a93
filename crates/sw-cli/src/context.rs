//! Runtime context for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use sw_core::{discover_definitions, Config, MigrationManager};
use sw_db::DuckDbStore;

use crate::cli::GlobalArgs;

/// Loaded configuration plus an open migration store
pub(crate) struct RuntimeContext {
    /// Project configuration
    pub config: Config,

    /// Directory holding `<version>.<up|down>.sql` files
    pub migrations_dir: PathBuf,

    /// Path of the database the store was opened on
    pub database: String,

    /// Migration store
    pub store: DuckDbStore,
}

impl RuntimeContext {
    /// Create a runtime context from global arguments.
    ///
    /// Paths from the config file resolve against the project directory;
    /// `--migrations-dir` and `--database` are used as given.
    pub(crate) fn new(args: &GlobalArgs) -> Result<Self> {
        let root = Path::new(&args.project_dir);

        let config = match &args.config {
            Some(path) => {
                Config::load(Path::new(path)).context("Failed to load configuration file")?
            }
            None => Config::load_or_default(root).context("Failed to load project configuration")?,
        };

        let migrations_dir = match &args.migrations_dir {
            Some(dir) => PathBuf::from(dir),
            None => config.migrations_dir_absolute(root),
        };

        let database = match &args.database {
            Some(path) => path.clone(),
            None => {
                let target = Config::resolve_target(args.target.as_deref());
                let db_config = config
                    .get_database_config(target.as_deref())
                    .context("Failed to get database configuration")?;
                resolve_database_path(root, &db_config.path)
            }
        };

        log::debug!(
            "Using database {database} with table {}, migrations in {}",
            config.table,
            migrations_dir.display()
        );
        let store =
            DuckDbStore::open(&database, &config.table).context("Failed to connect to database")?;

        Ok(Self {
            config,
            migrations_dir,
            database,
            store,
        })
    }

    /// Build a manager with every definition in the migrations directory
    /// registered.
    pub(crate) fn manager(&self) -> Result<MigrationManager<'_, DuckDbStore>> {
        let definitions = discover_definitions(&self.migrations_dir)
            .context("Failed to load migration definitions")?;
        let mut manager = MigrationManager::new(&self.store);
        manager
            .register_all(definitions)
            .context("Failed to register migration definitions")?;
        log::debug!(
            "Registered {} version(s) from {}",
            manager.registered_versions().len(),
            self.migrations_dir.display()
        );
        Ok(manager)
    }
}

fn resolve_database_path(root: &Path, path: &str) -> String {
    if path == ":memory:" || Path::new(path).is_absolute() {
        path.to_string()
    } else {
        root.join(path).display().to_string()
    }
}
