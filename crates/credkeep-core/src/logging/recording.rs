//! Logger that keeps its records in memory

use parking_lot::Mutex;

use super::file_logger::LogLevel;
use super::traits::Logger;

/// A logger that records every message instead of printing it
///
/// Useful in tests, and for integrators that want to surface the probe's
/// diagnostics in their own UI.
///
/// # Example
///
/// ```
/// use credkeep_core::logging::{Logger, LogLevel, RecordingLogger};
///
/// let logger = RecordingLogger::new();
/// logger.warn("keyring locked");
/// assert_eq!(logger.records(), vec![(LogLevel::Warn, "keyring locked".to_string())]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far, oldest first
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        self.records.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.lock().push((level, message.to_string()));
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}
