//! Attribute schemas and their derivation from attribute sets

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::attributes::AttributeSet;

/// Declared type of a schema attribute
///
/// Only metadata handed to the backend. Attribute values stay strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    #[default]
    String,
    Integer,
    Boolean,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Integer => "integer",
            AttributeType::Boolean => "boolean",
        }
    }

    /// Whether `value` is a valid string form of this type
    ///
    /// Integers are 32-bit signed, booleans are `true` or `false`.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            AttributeType::String => true,
            AttributeType::Integer => value.parse::<i32>().is_ok(),
            AttributeType::Boolean => value == "true" || value == "false",
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema flags understood by secret backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaFlags {
    /// Items only match when stored under the same schema name
    #[default]
    None,
    /// The schema name is not part of the match, only the attributes are
    DontMatchName,
}

/// Named, typed declaration of the attributes a class of secrets carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    name: String,
    flags: SchemaFlags,
    attribute_types: BTreeMap<String, AttributeType>,
}

impl AttributeSchema {
    /// Declare a schema explicitly
    pub fn new(
        name: impl Into<String>,
        flags: SchemaFlags,
        attribute_types: BTreeMap<String, AttributeType>,
    ) -> Self {
        Self {
            name: name.into(),
            flags,
            attribute_types,
        }
    }

    /// Derive a schema from the attributes it will be used with
    ///
    /// The result declares exactly the keys of `attributes`. Each takes its
    /// type from `attribute_types` when listed there and is a string
    /// otherwise. Types for keys that are not attributes are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use credkeep_core::schema::{AttributeSchema, AttributeSet, AttributeType};
    ///
    /// let attributes = AttributeSet::new().with("account", "alice").with("version", 2);
    /// let types = HashMap::from([("version".to_string(), AttributeType::Integer)]);
    ///
    /// let schema = AttributeSchema::derive("org.example.TokenCache", &attributes, Some(&types));
    /// assert_eq!(schema.attribute_type("account"), Some(AttributeType::String));
    /// assert_eq!(schema.attribute_type("version"), Some(AttributeType::Integer));
    /// ```
    pub fn derive(
        name: impl Into<String>,
        attributes: &AttributeSet,
        attribute_types: Option<&HashMap<String, AttributeType>>,
    ) -> Self {
        Self::new(
            name,
            SchemaFlags::None,
            derive_attribute_types(attributes, attribute_types),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> SchemaFlags {
        self.flags
    }

    /// Declared attribute types, keyed by attribute name
    pub fn attribute_types(&self) -> &BTreeMap<String, AttributeType> {
        &self.attribute_types
    }

    pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
        self.attribute_types.get(name).copied()
    }

    /// Whether a stored item's schema name satisfies this schema
    pub fn matches_name(&self, stored_name: &str) -> bool {
        self.flags == SchemaFlags::DontMatchName || self.name == stored_name
    }
}

/// Type map with one entry per attribute, strings unless listed in `attribute_types`
pub fn derive_attribute_types(
    attributes: &AttributeSet,
    attribute_types: Option<&HashMap<String, AttributeType>>,
) -> BTreeMap<String, AttributeType> {
    attributes
        .names()
        .map(|key| {
            let declared = attribute_types
                .and_then(|types| types.get(key).copied())
                .unwrap_or_default();
            (key.to_string(), declared)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> AttributeSet {
        [("attr1", "foo"), ("attr2", "bar")].into_iter().collect()
    }

    #[test]
    fn test_derive_defaults_to_string() {
        let schema = AttributeSchema::derive("Test Schema", &attrs(), None);

        assert_eq!(schema.name(), "Test Schema");
        assert_eq!(schema.flags(), SchemaFlags::None);
        assert_eq!(schema.attribute_types().len(), 2);
        assert_eq!(schema.attribute_type("attr1"), Some(AttributeType::String));
        assert_eq!(schema.attribute_type("attr2"), Some(AttributeType::String));
    }

    #[test]
    fn test_derive_uses_partial_types() {
        let attributes = attrs().with("count", 7).with("enabled", false);
        let types = HashMap::from([
            ("count".to_string(), AttributeType::Integer),
            ("enabled".to_string(), AttributeType::Boolean),
        ]);

        let schema = AttributeSchema::derive("Typed", &attributes, Some(&types));

        assert_eq!(schema.attribute_type("count"), Some(AttributeType::Integer));
        assert_eq!(schema.attribute_type("enabled"), Some(AttributeType::Boolean));
        assert_eq!(schema.attribute_type("attr1"), Some(AttributeType::String));
    }

    #[test]
    fn test_derive_keys_match_attributes_exactly() {
        let types = HashMap::from([
            ("attr1".to_string(), AttributeType::Integer),
            ("not_an_attribute".to_string(), AttributeType::Boolean),
        ]);

        let schema = AttributeSchema::derive("Extra", &attrs(), Some(&types));

        let keys: Vec<_> = schema.attribute_types().keys().cloned().collect();
        assert_eq!(keys, vec!["attr1".to_string(), "attr2".to_string()]);
        assert_eq!(schema.attribute_type("not_an_attribute"), None);
    }

    #[test]
    fn test_derive_empty_attributes() {
        let schema = AttributeSchema::derive("Empty", &AttributeSet::new(), None);
        assert!(schema.attribute_types().is_empty());
    }

    #[test]
    fn test_type_acceptance() {
        assert!(AttributeType::String.accepts("anything"));
        assert!(AttributeType::Integer.accepts("-42"));
        assert!(!AttributeType::Integer.accepts("4.2"));
        assert!(!AttributeType::Integer.accepts("99999999999"));
        assert!(AttributeType::Boolean.accepts("false"));
        assert!(!AttributeType::Boolean.accepts("yes"));
    }

    #[test]
    fn test_name_matching_flags() {
        let strict = AttributeSchema::new("A", SchemaFlags::None, BTreeMap::new());
        assert!(strict.matches_name("A"));
        assert!(!strict.matches_name("B"));

        let loose = AttributeSchema::new("A", SchemaFlags::DontMatchName, BTreeMap::new());
        assert!(loose.matches_name("B"));
    }

    #[test]
    fn test_attribute_type_serde_names() {
        let parsed: AttributeType = serde_yaml::from_str("integer").unwrap();
        assert_eq!(parsed, AttributeType::Integer);
        assert_eq!(serde_yaml::to_string(&AttributeType::Boolean).unwrap().trim(), "boolean");
    }
}
