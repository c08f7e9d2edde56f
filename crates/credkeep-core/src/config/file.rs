//! File-based agent configuration (YAML)
//!
//! User-level config lives at `<config dir>/credkeep/config.yaml`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::agent::SecretAgent;
use crate::backend::{create_backend, DEFAULT_BACKEND};
use crate::logging::SharedLogger;
use crate::schema::{AttributeSet, AttributeType, Collection};

fn default_backend_name() -> String {
    DEFAULT_BACKEND.to_string()
}

/// Everything needed to build a `SecretAgent`
///
/// ```yaml
/// backend: keyring
/// schema_name: org.example.TokenCache
/// label: Token cache
/// attributes:
///   account: alice
///   version: 2
/// attribute_types:
///   version: integer
/// collection: login
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Registered backend name
    #[serde(default = "default_backend_name")]
    pub backend: String,

    #[serde(default)]
    pub schema_name: String,

    #[serde(default)]
    pub attributes: AttributeSet,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attribute_types: HashMap<String, AttributeType>,

    /// Target collection; absent means the platform default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            backend: default_backend_name(),
            schema_name: String::new(),
            attributes: AttributeSet::new(),
            label: String::new(),
            attribute_types: HashMap::new(),
            collection: None,
        }
    }
}

impl AgentConfig {
    /// Build the configured agent, resolving the backend by name
    pub fn build_agent(&self, logger: Option<SharedLogger>) -> ConfigResult<SecretAgent> {
        if self.schema_name.is_empty() {
            return Err(ConfigError::Missing("schema_name"));
        }
        let backend = create_backend(&self.backend)
            .ok_or_else(|| ConfigError::UnknownBackend(self.backend.clone()))?;

        let mut builder = SecretAgent::builder(&self.schema_name, self.attributes.clone())
            .label(&self.label);
        if !self.attribute_types.is_empty() {
            builder = builder.attribute_types(self.attribute_types.clone());
        }
        if let Some(collection) = &self.collection {
            builder = builder.collection(collection.clone());
        }
        if let Some(logger) = logger {
            builder = builder.logger(logger);
        }
        Ok(builder.build(backend))
    }
}

/// YAML file holding an `AgentConfig`
///
/// # Example
///
/// ```no_run
/// use credkeep_core::config::FileConfig;
///
/// let config = FileConfig::user().load().unwrap();
/// let agent = config.build_agent(None).unwrap();
/// let cached = agent.load().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// User-level config (~/.config/credkeep/config.yaml on Linux)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("credkeep").join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the config; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<AgentConfig> {
        if !self.path.exists() {
            return Ok(AgentConfig::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write the config, creating parent directories as needed
    pub fn save(&self, config: &AgentConfig) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{register_backend, unregister_backend, MemoryBackend};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let file = FileConfig::new(dir.path().join("absent.yaml"));

        assert!(!file.exists());
        let config = file.load().unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.backend, "keyring");
    }

    #[test]
    fn test_parse_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "backend: memory\n\
             schema_name: org.example.TokenCache\n\
             label: Token cache\n\
             attributes:\n  account: alice\n  version: 2\n  enabled: true\n\
             attribute_types:\n  version: integer\n\
             collection: login\n",
        )
        .unwrap();

        let config = FileConfig::new(&path).load().unwrap();

        assert_eq!(config.backend, "memory");
        assert_eq!(config.schema_name, "org.example.TokenCache");
        assert_eq!(config.attributes.get("account"), Some("alice"));
        assert_eq!(config.attributes.get("version"), Some("2"));
        assert_eq!(config.attributes.get("enabled"), Some("true"));
        assert_eq!(config.attribute_types.get("version"), Some(&AttributeType::Integer));
        assert_eq!(config.collection, Some(Collection::new("login")));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = FileConfig::new(dir.path().join("nested").join("config.yaml"));
        let config = AgentConfig {
            backend: "memory".to_string(),
            schema_name: "Saved".to_string(),
            attributes: AttributeSet::new().with("k", "v"),
            ..AgentConfig::default()
        };

        file.save(&config).unwrap();

        assert!(file.exists());
        assert_eq!(file.load().unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "attributes: [not, a, map]\n").unwrap();

        let err = FileConfig::new(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_build_agent() {
        register_backend(
            "config_test_memory",
            "memory backend for config tests",
            Box::new(|| Arc::new(MemoryBackend::new())),
        );
        let config = AgentConfig {
            backend: "config_test_memory".to_string(),
            schema_name: "Configured".to_string(),
            attributes: AttributeSet::new().with("version", "3"),
            label: "From config".to_string(),
            attribute_types: HashMap::from([("version".to_string(), AttributeType::Integer)]),
            collection: Some(Collection::new("session")),
        };

        let agent = config.build_agent(None).unwrap();

        assert_eq!(agent.backend().name(), "memory");
        assert_eq!(agent.schema().name(), "Configured");
        assert_eq!(agent.schema().attribute_type("version"), Some(AttributeType::Integer));
        assert_eq!(agent.label(), "From config");
        assert_eq!(agent.collection(), Some(&Collection::new("session")));
        assert!(agent.save("configured").unwrap());
        assert_eq!(agent.load().unwrap(), Some("configured".to_string()));

        unregister_backend("config_test_memory");
    }

    #[test]
    fn test_build_agent_errors() {
        let unnamed = AgentConfig::default();
        assert!(matches!(unnamed.build_agent(None), Err(ConfigError::Missing("schema_name"))));

        let unknown = AgentConfig {
            backend: "no_such_backend".to_string(),
            schema_name: "X".to_string(),
            ..AgentConfig::default()
        };
        assert!(matches!(
            unknown.build_agent(None),
            Err(ConfigError::UnknownBackend(name)) if name == "no_such_backend"
        ));
    }
}
