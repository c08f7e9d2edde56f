//! Backend registry for discovering and creating backends by name

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::keychain::KeyringBackend;
use super::memory::MemoryBackend;
use super::traits::SecretBackend;

/// Name of the backend `default_backend()` creates
pub const DEFAULT_BACKEND: &str = "keyring";

/// Factory function type for creating backends
pub type BackendFactory = Box<dyn Fn() -> Arc<dyn SecretBackend> + Send + Sync>;

/// Definition of a registered backend
pub struct BackendDefinition {
    /// Unique name for this backend
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: BackendFactory,
}

impl std::fmt::Debug for BackendDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

static REGISTRY: Lazy<RwLock<HashMap<String, BackendDefinition>>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert(
        "keyring".to_string(),
        BackendDefinition {
            name: "keyring".to_string(),
            description: "System keychain (macOS Keychain, Windows Credential Manager, Linux Secret Service)".to_string(),
            factory: Box::new(|| Arc::new(KeyringBackend::new())),
        },
    );

    map.insert(
        "memory".to_string(),
        BackendDefinition {
            name: "memory".to_string(),
            description: "In-process storage for testing".to_string(),
            factory: Box::new(|| Arc::new(MemoryBackend::new())),
        },
    );

    RwLock::new(map)
});

/// Register a new backend type, replacing any previous one with that name
///
/// # Example
///
/// ```
/// use credkeep_core::backend::{create_backend, register_backend, MemoryBackend};
/// use std::sync::Arc;
///
/// register_backend(
///     "scratch",
///     "Throwaway store",
///     Box::new(|| Arc::new(MemoryBackend::new())),
/// );
/// assert!(create_backend("scratch").is_some());
/// ```
pub fn register_backend(name: &str, description: &str, factory: BackendFactory) {
    REGISTRY.write().insert(
        name.to_string(),
        BackendDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    );
}

/// Create a backend by name, or None if the name is not registered
pub fn create_backend(name: &str) -> Option<Arc<dyn SecretBackend>> {
    REGISTRY.read().get(name).map(|def| (def.factory)())
}

/// The backend used when the caller does not pick one
pub fn default_backend() -> Arc<dyn SecretBackend> {
    create_backend(DEFAULT_BACKEND).unwrap_or_else(|| Arc::new(KeyringBackend::new()))
}

/// List all registered backends as (name, description) pairs, sorted by name
pub fn list_backends() -> Vec<(String, String)> {
    let mut backends: Vec<_> = REGISTRY
        .read()
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    backends.sort();
    backends
}

/// Check if a backend is registered
pub fn has_backend(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Unregister a backend (mainly for testing)
pub fn unregister_backend(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}
