//! Logging port used by the migration manager.
//!
//! The manager reports progress through a [`MigrationLog`] it owns instead of
//! calling the `log` macros directly, so callers decide where the messages go.

use log::Level;

/// Log target used by [`LogFacade`].
pub const LOG_TARGET: &str = "stepwise";

/// Leveled sink for migration progress messages.
pub trait MigrationLog {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Forwards messages to the global `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl MigrationLog for LogFacade {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{message}");
    }
}

