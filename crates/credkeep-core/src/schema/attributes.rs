//! Attribute sets and collection handles

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

/// Attribute filter shared by every operation of an agent
///
/// Values are always strings at the storage boundary, whatever type the
/// schema declares for them. Keys are unique and kept sorted, so two sets
/// built from the same pairs in a different order compare equal.
///
/// Deserializing accepts integer and boolean values as well as strings and
/// keeps their string form, so `version: 2` and `version: "2"` are the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, String>);

/// Scalar attribute value as written in a config file
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl ScalarValue {
    fn into_string(self) -> String {
        match self {
            ScalarValue::Boolean(value) => value.to_string(),
            ScalarValue::Integer(value) => value.to_string(),
            ScalarValue::Text(value) => value,
        }
    }
}

impl<'de> Deserialize<'de> for AttributeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, ScalarValue>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(name, value)| (name, value.into_string()))
                .collect(),
        ))
    }
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace an attribute
    ///
    /// Integers and booleans are stored in their string form.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) -> Option<String> {
        self.0.insert(name.into(), value.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Attribute names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in sorted name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl From<HashMap<String, String>> for AttributeSet {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for AttributeSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Name or alias of an OS-level secret collection
///
/// Agents only carry this handle around; they never create, unlock or
/// otherwise manage the collection itself. An agent without a collection
/// targets the platform default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(String);

impl Collection {
    /// Alias of the platform default collection
    pub const DEFAULT_ALIAS: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Handle on the platform default collection
    pub fn default_collection() -> Self {
        Self::new(Self::DEFAULT_ALIAS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT_ALIAS
    }

    /// Resolve an optional collection to a concrete one
    pub fn resolve(collection: Option<&Collection>) -> Collection {
        collection.cloned().unwrap_or_else(Self::default_collection)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Collection {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Collection {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_is_irrelevant() {
        let a: AttributeSet = [("attr1", "foo"), ("attr2", "bar")].into_iter().collect();
        let b: AttributeSet = [("attr2", "bar"), ("attr1", "foo")].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.names().collect::<Vec<_>>(), vec!["attr1", "attr2"]);
    }

    #[test]
    fn test_values_are_stored_as_strings() {
        let set = AttributeSet::new()
            .with("version", 3)
            .with("enabled", true)
            .with("name", "cache");

        assert_eq!(set.get("version"), Some("3"));
        assert_eq!(set.get("enabled"), Some("true"));
        assert_eq!(set.get("name"), Some("cache"));
        assert_eq!(set.get("missing"), None);
    }

    #[test]
    fn test_duplicate_keys_keep_last_value() {
        let set: AttributeSet = [("k", "first"), ("k", "second")].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("k"), Some("second"));
    }

    #[test]
    fn test_deserialize_scalar_values_as_strings() {
        let set: AttributeSet =
            serde_yaml::from_str("version: 2\nenabled: true\nquoted: \"7\"\nname: cache\n").unwrap();

        assert_eq!(set.get("version"), Some("2"));
        assert_eq!(set.get("enabled"), Some("true"));
        assert_eq!(set.get("quoted"), Some("7"));
        assert_eq!(set.get("name"), Some("cache"));
    }

    #[test]
    fn test_deserialize_rejects_nested_values() {
        assert!(serde_yaml::from_str::<AttributeSet>("nested: [1, 2]\n").is_err());
    }

    #[test]
    fn test_collection_resolution() {
        assert!(Collection::resolve(None).is_default());

        let session = Collection::new("session");
        assert_eq!(Collection::resolve(Some(&session)), session);
        assert!(!session.is_default());
        assert_eq!(session.to_string(), "session");
    }
}
