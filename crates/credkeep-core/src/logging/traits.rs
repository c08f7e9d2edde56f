//! Logger trait definition

use std::error::Error;
use std::sync::Arc;

/// Logger abstraction injected into agents and the availability probe
///
/// Implementations:
/// - `NoOpLogger`: Silent logger for testing
/// - `ConsoleLogger`: Logs to stdout/stderr
/// - `RecordingLogger`: Keeps records in memory for later inspection
/// - `FileLogger`: Forwards to the global debug log file
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);

    /// Log an error message together with the full source chain of `err`
    ///
    /// This is the developer-facing diagnostic record. The default rendering
    /// writes one `caused by:` line per source.
    fn exception(&self, message: &str, err: &(dyn Error + 'static)) {
        self.error(&render_exception(message, err));
    }
}

/// Render `message` followed by `err` and each of its sources
pub fn render_exception(message: &str, err: &(dyn Error + 'static)) -> String {
    let mut rendered = format!("{}\nerror: {}", message, err);
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(&format!("\ncaused by: {}", cause));
        source = cause.source();
    }
    rendered
}

/// Type alias for an Arc-wrapped logger
pub type SharedLogger = Arc<dyn Logger>;

/// Format a message and log it at debug level
///
/// Works with anything exposing `debug(&str)`, including a `SharedLogger`.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}
