//! System keychain secret backend
//!
//! Uses the OS keychain for secure secret storage:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::credential::CredentialApi;
use keyring::Entry;

use super::traits::{SecretBackend, SecretServiceError, SecretServiceResult};
use crate::logging::file_logger as log;
use crate::schema::{AttributeSchema, AttributeSet, Collection};

const MODULE: &str = "KeyringBackend";

/// Backend on top of the platform credential store
///
/// keyring entries are addressed by (target, service, user) rather than by
/// arbitrary attributes, so the filter is folded into that address:
///
/// - service: the schema name
/// - user: the attribute set, encoded canonically by [`encode_attributes`]
/// - target: the collection, or the platform default when absent
///
/// The attribute types of the schema are not representable in a keyring
/// entry and are not sent. Neither is the label; platform viewers show the
/// label keyring derives from the address instead.
///
/// Building an entry never contacts the platform service, so this backend
/// keeps the default `is_available()`. Use `trial_run_with` to find out
/// whether the service actually works.
///
/// # Example
///
/// ```no_run
/// use credkeep_core::backend::{KeyringBackend, SecretBackend};
/// use credkeep_core::schema::{AttributeSchema, AttributeSet};
///
/// let backend = KeyringBackend::new();
/// let attributes = AttributeSet::new().with("account", "alice");
/// let schema = AttributeSchema::derive("org.example.Cache", &attributes, None);
///
/// backend.store(&schema, &attributes, None, "Token cache", "blob").unwrap();
/// let blob = backend.lookup(&schema, &attributes, None).unwrap();
/// assert_eq!(blob.as_deref(), Some("blob"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyringBackend {
    _private: (),
}

/// Where a filter lives in the platform store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAddress {
    /// Collection name, None for the platform default
    pub target: Option<String>,
    /// Schema name
    pub service: String,
    /// Encoded attribute set
    pub user: String,
}

impl EntryAddress {
    pub fn for_filter(
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
    ) -> Self {
        Self {
            target: collection.map(|c| c.as_str().to_string()),
            service: schema.name().to_string(),
            user: encode_attributes(attributes),
        }
    }

    /// Create the keyring entry for this address
    pub fn entry(&self) -> SecretServiceResult<Entry> {
        let entry = match &self.target {
            Some(target) => Entry::new_with_target(target, &self.service, &self.user),
            None => Entry::new(&self.service, &self.user),
        };
        entry.map_err(map_keyring_error)
    }
}

impl KeyringBackend {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl SecretBackend for KeyringBackend {
    fn name(&self) -> &str {
        "keyring"
    }

    fn store(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
        label: &str,
        payload: &str,
    ) -> SecretServiceResult<bool> {
        let address = EntryAddress::for_filter(schema, attributes, collection);
        log::debug(
            MODULE,
            &format!(
                "store() service='{}', target={:?}, label='{}', len={}",
                address.service,
                address.target,
                label,
                payload.len()
            ),
        );
        store_in(&address.entry()?, payload)
    }

    fn lookup(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
    ) -> SecretServiceResult<Option<String>> {
        lookup_in(&EntryAddress::for_filter(schema, attributes, collection).entry()?)
    }

    fn clear(
        &self,
        schema: &AttributeSchema,
        attributes: &AttributeSet,
        collection: Option<&Collection>,
    ) -> SecretServiceResult<bool> {
        clear_in(&EntryAddress::for_filter(schema, attributes, collection).entry()?)
    }
}

fn store_in(entry: &Entry, payload: &str) -> SecretServiceResult<bool> {
    entry.set_password(payload).map_err(|e| {
        log::error(MODULE, &format!("set_password FAILED: {:?}", e));
        map_keyring_error(e)
    })?;
    Ok(true)
}

fn lookup_in(entry: &Entry) -> SecretServiceResult<Option<String>> {
    match entry.get_password() {
        Ok(password) => {
            log::debug(MODULE, &format!("lookup() found, len={}", password.len()));
            Ok(Some(password))
        }
        Err(keyring::Error::NoEntry) => {
            log::debug(MODULE, "lookup() NoEntry");
            Ok(None)
        }
        Err(keyring::Error::Ambiguous(credentials)) => {
            log::warn(
                MODULE,
                &format!("lookup() matched {} items, using the first", credentials.len()),
            );
            match credentials.first() {
                Some(credential) => match credential.get_password() {
                    Ok(password) => Ok(Some(password)),
                    Err(keyring::Error::NoEntry) => Ok(None),
                    Err(e) => Err(map_keyring_error(e)),
                },
                None => Ok(None),
            }
        }
        Err(e) => {
            log::error(MODULE, &format!("get_password FAILED: {:?}", e));
            Err(map_keyring_error(e))
        }
    }
}

fn clear_in(entry: &Entry) -> SecretServiceResult<bool> {
    match entry.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(keyring::Error::Ambiguous(credentials)) => {
            log::debug(MODULE, &format!("clear() removing {} items", credentials.len()));
            let mut removed = false;
            for credential in &credentials {
                match credential.delete_credential() {
                    Ok(()) => removed = true,
                    Err(keyring::Error::NoEntry) => {}
                    Err(e) => return Err(map_keyring_error(e)),
                }
            }
            Ok(removed)
        }
        Err(e) => {
            log::error(MODULE, &format!("delete_credential FAILED: {:?}", e));
            Err(map_keyring_error(e))
        }
    }
}

/// Canonical string form of an attribute set
///
/// Pairs are written as `name=value` in sorted name order and joined with
/// `&`. Backslash, `&` and `=` are escaped with a backslash, so distinct sets
/// never encode to the same string. The empty set encodes as `*`, which no
/// non-empty set can produce since those always contain `=`.
pub fn encode_attributes(attributes: &AttributeSet) -> String {
    if attributes.is_empty() {
        return "*".to_string();
    }
    attributes
        .iter()
        .map(|(name, value)| format!("{}={}", escape(name), escape(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '&' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Translate a keyring error into the backend error taxonomy
fn map_keyring_error(err: keyring::Error) -> SecretServiceError {
    match err {
        keyring::Error::NoStorageAccess(source) => {
            SecretServiceError::locked_with("credential store refused access", source)
        }
        keyring::Error::PlatformFailure(source) => {
            SecretServiceError::unavailable_with("credential store is not reachable", source)
        }
        keyring::Error::BadEncoding(_) => SecretServiceError::BadEncoding,
        keyring::Error::TooLong(name, limit) => {
            SecretServiceError::invalid_attribute(name, format!("longer than {} characters", limit))
        }
        keyring::Error::Invalid(name, reason) => SecretServiceError::invalid_attribute(name, reason),
        keyring::Error::Ambiguous(credentials) => SecretServiceError::Ambiguous(credentials.len()),
        other => SecretServiceError::Other(other.to_string()),
    }
}
