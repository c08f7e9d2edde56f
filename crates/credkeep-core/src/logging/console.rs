//! Console logger implementation

use super::file_logger::LogLevel;
use super::traits::Logger;

/// A logger that writes to stderr
///
/// Records below the minimum level are dropped. The default minimum is
/// `Info`, which hides the agents' per-call debug lines. `trial_run()` uses
/// `Warn` so that users only see the probe's diagnostics.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a new console logger with default prefix
    pub fn new() -> Self {
        Self::with_prefix("[credkeep]")
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            min_level: LogLevel::Info,
        }
    }

    /// Drop records below `level`
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Whether a record at `level` would be written
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn write(&self, level: LogLevel, message: &str) {
        if self.enabled(level) {
            eprintln!("{} {}: {}", self.prefix, level.to_string().trim_end(), message);
        }
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}
