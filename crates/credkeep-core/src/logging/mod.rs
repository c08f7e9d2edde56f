//! Logging abstractions injected into agents and the availability probe

mod traits;
mod noop;
mod console;
mod recording;
pub mod file_logger;

pub use traits::{Logger, SharedLogger, render_exception};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use recording::RecordingLogger;

// Re-export file logger functions for convenience
pub use file_logger::{
    log, debug, info, warn, error,
    log_file_path, FileLogger, LogLevel,
};
