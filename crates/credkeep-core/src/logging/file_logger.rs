//! File-based debug logger for troubleshooting backends
//!
//! Backends write their internal diagnostics here rather than through the
//! injected logger, so that a headless session can still be inspected after
//! the fact. Disabled unless `CREDKEEP_DEBUG` is `1` or `true`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::traits::Logger;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

struct FileLoggerState {
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

impl FileLoggerState {
    fn new() -> Self {
        let enabled = std::env::var("CREDKEEP_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("CREDKEEP_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);

        // Only touch the filesystem when logging is switched on
        let file = if enabled { open_log_file() } else { None };

        Self { file, min_level, enabled }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if let Some(ref mut file) = self.file {
            let timestamp = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| {
                    let secs = d.as_secs();
                    let millis = d.subsec_millis();
                    let hours = (secs % 86400) / 3600;
                    let mins = (secs % 3600) / 60;
                    let secs = secs % 60;
                    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
                })
                .unwrap_or_else(|_| "??:??:??.???".to_string());

            let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp, level, module, message);
            let _ = file.flush();
        }
    }
}

fn open_log_file() -> Option<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
        .ok()
}

static LOGGER: Lazy<Mutex<FileLoggerState>> = Lazy::new(|| Mutex::new(FileLoggerState::new()));

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    LOGGER.lock().write(level, module, message);
}

/// Log a debug message
pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

/// Log an info message
pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

/// Log a warning message
pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

/// Log an error message
pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

/// Get the path to the log file
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("credkeep-debug.log")
}

/// `Logger` adapter over the global debug log file
///
/// Lets callers hand the debug file to an agent or to `trial_run_with`.
#[derive(Debug, Clone)]
pub struct FileLogger {
    module: String,
}

impl FileLogger {
    /// Create a file logger that tags every line with `module`
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

impl Default for FileLogger {
    fn default() -> Self {
        Self::new("credkeep")
    }
}

impl Logger for FileLogger {
    fn debug(&self, message: &str) {
        debug(&self.module, message);
    }

    fn info(&self, message: &str) {
        info(&self.module, message);
    }

    fn warn(&self, message: &str) {
        warn(&self.module, message);
    }

    fn error(&self, message: &str) {
        error(&self.module, message);
    }
}
