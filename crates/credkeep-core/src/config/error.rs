//! Configuration errors

/// Errors that can occur while loading or applying configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
