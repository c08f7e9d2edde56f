//! Core traits and error types for secret backends

use std::collections::BTreeMap;

use thiserror::Error;

use crate::schema::{AttributeSchema, AttributeSet, AttributeType, Collection, SchemaFlags};

/// Boxed error used as the cause of a backend failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by a secret backend
///
/// Agents pass these through untouched. `Unavailable` and `Locked` are the
/// "service not usable here" class that headless and SSH sessions run into;
/// see [`SecretServiceError::is_unavailable`].
#[derive(Error, Debug)]
pub enum SecretServiceError {
    /// The service cannot be reached: no daemon, no session bus, no backend
    #[error("Secret service unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The service answered but the collection is locked or access was denied
    #[error("Secret service locked: {message}")]
    Locked {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// An attribute was rejected by the service
    #[error("Invalid attribute '{name}': {reason}")]
    InvalidAttribute { name: String, reason: String },

    /// The stored secret is not valid UTF-8
    #[error("Stored secret is not valid UTF-8")]
    BadEncoding,

    /// The filter matched more items than the operation can handle
    #[error("Attribute filter matched {0} items")]
    Ambiguous(usize),

    /// Other error
    #[error("Secret service error: {0}")]
    Other(String),
}

impl SecretServiceError {
    /// Create an unavailable error without a cause
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create an unavailable error caused by `source`
    pub fn unavailable_with(message: impl Into<String>, source: BoxError) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a locked error without a cause
    pub fn locked(message: impl Into<String>) -> Self {
        Self::Locked {
            message: message.into(),
            source: None,
        }
    }

    /// Create a locked error caused by `source`
    pub fn locked_with(message: impl Into<String>, source: BoxError) -> Self {
        Self::Locked {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an invalid attribute error
    pub fn invalid_attribute(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the service itself is unusable, as opposed to a bad request
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Locked { .. })
    }
}

pub type SecretServiceResult<T> = Result<T, SecretServiceError>;

/// A capability-typed secret store with attribute filtering
///
/// This is the seam to the OS secret service. Every call is blocking and
/// independent; implementations hold no session state between calls that
/// callers can observe.
///
/// Implementations:
/// - `KeyringBackend`: the platform store through the `keyring` crate
/// - `MemoryBackend`: in-process item store for tests and ephemeral use
///
/// `collection` is `None` for the platform default collection. It scopes
/// `lookup` and `clear` as well as `store`.
pub trait SecretBackend: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// Cheap check whether this backend could be used at all
    ///
    /// A `true` here does not guarantee that a store will succeed; the
    /// availability probe is the authoritative check.
    fn is_available(&self) -> bool {
        true
    }

    /// Declare a schema
    ///
    /// Declaring a schema never touches the service.
    fn register_schema(
        &self,
        name: &str,
        flags: SchemaFlags,
        attribute_types: BTreeMap<String, AttributeType>,
    ) -> AttributeSchema {
        AttributeSchema::new(name, flags, attribute_types)
    }

    /// Store `payload` under the filter, replacing a matching item
    ///
    /// Returns whether the service accepted the write.
    fn store(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
        label: &str,
        payload: &str,
    ) -> SecretServiceResult<bool>;

    /// Payload of the item matching the filter, if any
    fn lookup(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
    ) -> SecretServiceResult<Option<String>>;

    /// Delete every item matching the filter
    ///
    /// Returns whether at least one item was removed.
    fn clear(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
    ) -> SecretServiceResult<bool>;
}
