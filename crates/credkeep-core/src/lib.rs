//! credkeep Core
//!
//! Keeps a single opaque secret (an encryption key, a token cache) in the
//! operating system's credential store, so that token caches built on top
//! never implement their own encryption at rest.
//!
//! ## Agents
//!
//! A `SecretAgent` is bound to a schema name and a set of attributes. The
//! schema is derived from the attributes, and the same attribute filter is
//! used by every `save`, `load` and `clear`:
//!
//! ```rust,no_run
//! use credkeep_core::{default_backend, AttributeSet, SecretAgent};
//!
//! let attributes = AttributeSet::new().with("client_id", "my-app").with("env", "prod");
//! let agent = SecretAgent::builder("org.example.TokenCache", attributes)
//!     .label("my-app token cache")
//!     .build(default_backend());
//!
//! agent.save("{}")?;
//! let cache = agent.load()?;
//! # Ok::<(), credkeep_core::SecretServiceError>(())
//! ```
//!
//! ## Availability probe
//!
//! The platform store is often present but unusable (headless SSH session,
//! no running keyring daemon). `trial_run()` does a full round trip and
//! fails fast, logging a detailed and a short diagnostic:
//!
//! ```rust,no_run
//! if let Err(err) = credkeep_core::trial_run() {
//!     // fall back to another persistence strategy
//!     eprintln!("keyring unusable: {err}");
//! }
//! ```

pub mod schema;
pub mod backend;
pub mod agent;
pub mod logging;
pub mod config;

pub use schema::{AttributeSchema, AttributeSet, AttributeType, Collection, SchemaFlags};

pub use backend::{
    SecretBackend, SecretServiceError, SecretServiceResult,
    KeyringBackend, MemoryBackend,
    create_backend, default_backend, list_backends, register_backend,
};

pub use agent::{SecretAgent, SecretAgentBuilder, trial_run, trial_run_with, ProbeError, ProbeResult};

pub use logging::{Logger, SharedLogger, NoOpLogger, ConsoleLogger, RecordingLogger, FileLogger};

pub use config::{AgentConfig, FileConfig, ConfigError};
