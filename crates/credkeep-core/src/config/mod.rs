//! Agent configuration
//!
//! Lets a host application describe its agent (backend, schema, attributes,
//! collection) in a YAML file instead of code.

mod error;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use file::{AgentConfig, FileConfig};
