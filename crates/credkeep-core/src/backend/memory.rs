//! In-memory secret backend

use parking_lot::RwLock;

use super::traits::{SecretBackend, SecretServiceError, SecretServiceResult};
use crate::schema::{AttributeSchema, AttributeSet, Collection};

/// One stored secret item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub schema_name: String,
    pub attributes: AttributeSet,
    pub collection: Collection,
    pub label: String,
    pub payload: String,
}

/// Simulated state of the service behind a `MemoryBackend`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceState {
    #[default]
    Available,
    /// Every call fails with `SecretServiceError::Unavailable`
    Unavailable,
    /// Every call fails with `SecretServiceError::Locked`
    Locked,
}

/// In-memory backend following the Secret Service item model
///
/// Items live in a collection and carry a schema name and attributes.
/// Every operation matches items with exactly the filter's attribute set,
/// within the requested collection, the same way `KeyringBackend` addresses
/// entries. Storing replaces such an item. Attribute values are checked
/// against the schema's declared types, as the platform service does.
///
/// The service state can be switched to simulate a missing or locked
/// keyring, which is how the availability probe is exercised in tests.
///
/// # Example
///
/// ```
/// use credkeep_core::backend::{MemoryBackend, SecretBackend};
/// use credkeep_core::schema::{AttributeSchema, AttributeSet};
///
/// let backend = MemoryBackend::new();
/// let attributes = AttributeSet::new().with("account", "alice");
/// let schema = AttributeSchema::derive("org.example.Cache", &attributes, None);
///
/// assert!(backend.store(&schema, &attributes, None, "cache", "blob").unwrap());
/// assert_eq!(backend.lookup(&schema, &attributes, None).unwrap(), Some("blob".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<Vec<StoredItem>>,
    state: RwLock<ServiceState>,
}

impl MemoryBackend {
    /// Create a new empty, available backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the simulated service state
    pub fn set_state(&self, state: ServiceState) {
        *self.state.write() = state;
    }

    /// Make every call fail as if no secret service were running
    pub fn set_available(&self, available: bool) {
        self.set_state(if available {
            ServiceState::Available
        } else {
            ServiceState::Unavailable
        });
    }

    /// Make every call fail as if the collection were locked
    pub fn set_locked(&self, locked: bool) {
        self.set_state(if locked {
            ServiceState::Locked
        } else {
            ServiceState::Available
        });
    }

    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    /// Snapshot of every stored item
    pub fn items(&self) -> Vec<StoredItem> {
        self.items.read().clone()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_state(&self) -> SecretServiceResult<()> {
        match self.state() {
            ServiceState::Available => Ok(()),
            ServiceState::Unavailable => Err(SecretServiceError::unavailable(
                "memory backend is switched off",
            )),
            ServiceState::Locked => Err(SecretServiceError::locked(
                "memory backend collection is locked",
            )),
        }
    }

    fn validate(schema: &AttributeSchema, attributes: &AttributeSet) -> SecretServiceResult<()> {
        for (name, value) in attributes.iter() {
            let declared = schema.attribute_type(name).ok_or_else(|| {
                SecretServiceError::invalid_attribute(
                    name,
                    format!("not declared in schema '{}'", schema.name()),
                )
            })?;
            if !declared.accepts(value) {
                return Err(SecretServiceError::invalid_attribute(
                    name,
                    format!("'{}' is not a valid {}", value, declared),
                ));
            }
        }
        Ok(())
    }

    fn matches(
        item: &StoredItem,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: &Collection,
    ) -> bool {
        &item.collection == collection
            && schema.matches_name(&item.schema_name)
            && item.attributes == *attributes
    }
}

impl SecretBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_available(&self) -> bool {
        self.state() == ServiceState::Available
    }

    fn store(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
        label: &str,
        payload: &str,
    ) -> SecretServiceResult<bool> {
        self.check_state()?;
        Self::validate(schema, attributes)?;

        let item = StoredItem {
            schema_name: schema.name().to_string(),
            attributes: attributes.clone(),
            collection: Collection::resolve(collection),
            label: label.to_string(),
            payload: payload.to_string(),
        };

        let mut items = self.items.write();
        match items.iter_mut().find(|existing| {
            existing.schema_name == item.schema_name
                && existing.attributes == item.attributes
                && existing.collection == item.collection
        }) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Ok(true)
    }

    fn lookup(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
    ) -> SecretServiceResult<Option<String>> {
        self.check_state()?;
        Self::validate(schema, attributes)?;

        let collection = Collection::resolve(collection);
        let items = self.items.read();
        Ok(items
            .iter()
            .find(|item| Self::matches(item, schema, attributes, &collection))
            .map(|item| item.payload.clone()))
    }

    fn clear(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
    ) -> SecretServiceResult<bool> {
        self.check_state()?;
        Self::validate(schema, attributes)?;

        let collection = Collection::resolve(collection);
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|item| !Self::matches(item, schema, attributes, &collection));
        Ok(items.len() < before)
    }
}
