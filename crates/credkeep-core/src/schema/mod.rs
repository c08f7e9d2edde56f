//! Attribute schemas, attribute sets and collection handles
//!
//! Secret services want a declared schema before attributes can be used as
//! a filter. Callers here only describe the attributes; the schema is
//! derived from them with `AttributeSchema::derive`.

mod attributes;
mod types;

pub use attributes::{AttributeSet, Collection};
pub use types::{derive_attribute_types, AttributeSchema, AttributeType, SchemaFlags};
