//! Secret backends
//!
//! This module provides the seam to the OS secret service with:
//! - `SecretBackend` trait, the capability-typed store agents delegate to
//! - Built-in implementations: `KeyringBackend`, `MemoryBackend`
//! - A registry for discovering and creating backends by name

mod traits;
mod memory;
mod keychain;
mod registry;

pub use traits::{BoxError, SecretBackend, SecretServiceError, SecretServiceResult};
pub use memory::{MemoryBackend, ServiceState, StoredItem};
pub use keychain::{encode_attributes, EntryAddress, KeyringBackend};
pub use registry::{
    create_backend, default_backend, has_backend, list_backends, register_backend,
    unregister_backend, BackendDefinition, BackendFactory, DEFAULT_BACKEND,
};
