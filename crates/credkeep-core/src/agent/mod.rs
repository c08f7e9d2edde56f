//! Secret agent: one secret, one attribute filter, one backend
//!
//! ```
//! use std::sync::Arc;
//! use credkeep_core::agent::SecretAgent;
//! use credkeep_core::backend::MemoryBackend;
//! use credkeep_core::schema::AttributeSet;
//!
//! let attributes = AttributeSet::new().with("account", "alice").with("env", "prod");
//! let agent = SecretAgent::builder("org.example.TokenCache", attributes)
//!     .label("Token cache for alice")
//!     .build(Arc::new(MemoryBackend::new()));
//!
//! assert!(agent.save("{\"access_token\":\"...\"}").unwrap());
//! assert!(agent.load().unwrap().is_some());
//! assert!(agent.clear().unwrap());
//! ```

pub mod probe;

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{SecretBackend, SecretServiceResult};
use crate::log_debug;
use crate::logging::{NoOpLogger, SharedLogger};
use crate::schema::{
    derive_attribute_types, AttributeSchema, AttributeSet, AttributeType, Collection, SchemaFlags,
};

pub use probe::{trial_run, trial_run_with, ProbeError, ProbeResult};

/// Stores, loads and clears a single secret in a secret backend
///
/// The schema and the attribute filter are fixed when the agent is built and
/// every call uses exactly those. The label is only shown by secret viewers;
/// it does not take part in matching. The collection, when given, scopes
/// every call, including `load` and `clear`.
///
/// Backend errors are returned as they are; the agent never retries or
/// reinterprets them.
pub struct SecretAgent {
    backend: Arc<dyn SecretBackend>,
    schema: AttributeSchema,
    attributes: AttributeSet,
    label: String,
    collection: Option<Collection>,
    logger: SharedLogger,
}

impl SecretAgent {
    /// Agent with an empty label, string attributes and the default collection
    pub fn new(
        backend: Arc<dyn SecretBackend>,
        schema_name: impl Into<String>,
        attributes: AttributeSet,
    ) -> Self {
        Self::builder(schema_name, attributes).build(backend)
    }

    /// Start building an agent for `schema_name` and `attributes`
    pub fn builder(schema_name: impl Into<String>, attributes: AttributeSet) -> SecretAgentBuilder {
        SecretAgentBuilder::new(schema_name, attributes)
    }

    /// Store `data` as the secret, replacing any previous value
    ///
    /// Returns whether the backend accepted the write.
    pub fn save(&self, data: &str) -> SecretServiceResult<bool> {
        log_debug!(self.logger, "save() schema='{}', len={}", self.schema.name(), data.len());
        self.backend.store(
            &self.schema,
            &self.attributes,
            self.collection.as_ref(),
            &self.label,
            data,
        )
    }

    /// Load the secret, or None when nothing matches
    pub fn load(&self) -> SecretServiceResult<Option<String>> {
        let loaded = self
            .backend
            .lookup(&self.schema, &self.attributes, self.collection.as_ref())?;
        log_debug!(self.logger, "load() schema='{}', found={}", self.schema.name(), loaded.is_some());
        Ok(loaded)
    }

    /// Delete every matching secret
    ///
    /// Returns whether anything was removed.
    pub fn clear(&self) -> SecretServiceResult<bool> {
        let removed = self
            .backend
            .clear(&self.schema, &self.attributes, self.collection.as_ref())?;
        log_debug!(self.logger, "clear() schema='{}', removed={}", self.schema.name(), removed);
        Ok(removed)
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn collection(&self) -> Option<&Collection> {
        self.collection.as_ref()
    }

    pub fn backend(&self) -> &Arc<dyn SecretBackend> {
        &self.backend
    }
}

impl std::fmt::Debug for SecretAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretAgent")
            .field("backend", &self.backend.name())
            .field("schema", &self.schema)
            .field("attributes", &self.attributes)
            .field("label", &self.label)
            .field("collection", &self.collection)
            .finish()
    }
}

/// Builder for [`SecretAgent`]
///
/// The schema is derived once, in [`SecretAgentBuilder::build`].
pub struct SecretAgentBuilder {
    schema_name: String,
    attributes: AttributeSet,
    label: String,
    attribute_types: Option<HashMap<String, AttributeType>>,
    schema_flags: SchemaFlags,
    collection: Option<Collection>,
    logger: Option<SharedLogger>,
}

impl SecretAgentBuilder {
    pub fn new(schema_name: impl Into<String>, attributes: AttributeSet) -> Self {
        Self {
            schema_name: schema_name.into(),
            attributes,
            label: String::new(),
            attribute_types: None,
            schema_flags: SchemaFlags::None,
            collection: None,
            logger: None,
        }
    }

    /// Display label for secret viewers
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Declared types for some or all attributes; the rest are strings
    pub fn attribute_types(mut self, attribute_types: HashMap<String, AttributeType>) -> Self {
        self.attribute_types = Some(attribute_types);
        self
    }

    pub fn schema_flags(mut self, flags: SchemaFlags) -> Self {
        self.schema_flags = flags;
        self
    }

    /// Target collection; the platform default when never set
    pub fn collection(mut self, collection: impl Into<Collection>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Derive the schema through `backend` and build the agent
    pub fn build(self, backend: Arc<dyn SecretBackend>) -> SecretAgent {
        let types = derive_attribute_types(&self.attributes, self.attribute_types.as_ref());
        let schema = backend.register_schema(&self.schema_name, self.schema_flags, types);

        SecretAgent {
            backend,
            schema,
            attributes: self.attributes,
            label: self.label,
            collection: self.collection,
            logger: self.logger.unwrap_or_else(|| Arc::new(NoOpLogger::new())),
        }
    }
}
