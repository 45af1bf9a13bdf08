//! Read-only schema queries used during a merge.
//!
//! The merge only needs one fact from the schema model: whether a named type
//! is an input type. Adding a required field to an input type breaks clients
//! that construct it, while the same addition to an output type does not.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Schema facts the record comparator consults.
pub trait SchemaQuery {
    /// Whether `type_name` is an input type in the current schema.
    fn is_input_type(&self, type_name: &str) -> bool;
}

/// Serializable snapshot of the schema facts, as handed over by a generator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIndex {
    #[serde(default)]
    pub input_types: BTreeSet<String>,
}

impl SchemaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register an input type.
    pub fn with_input_type(mut self, name: impl Into<String>) -> Self {
        self.input_types.insert(name.into());
        self
    }

    /// Parse an index from its JSON form: `{"input_types": ["NewUser"]}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl SchemaQuery for SchemaIndex {
    fn is_input_type(&self, type_name: &str) -> bool {
        self.input_types.contains(type_name)
    }
}

impl SchemaQuery for HashSet<String> {
    fn is_input_type(&self, type_name: &str) -> bool {
        self.contains(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_index_lookup() {
        let schema = SchemaIndex::new().with_input_type("NewUser");
        assert!(schema.is_input_type("NewUser"));
        assert!(!schema.is_input_type("User"));
    }

    #[test]
    fn test_schema_index_from_json() {
        let schema = SchemaIndex::from_json(r#"{"input_types": ["ReviewInput", "NewUser"]}"#).unwrap();
        assert!(schema.is_input_type("ReviewInput"));
        assert_eq!(schema.input_types.len(), 2);

        let empty = SchemaIndex::from_json("{}").unwrap();
        assert!(empty.input_types.is_empty());
    }

    #[test]
    fn test_hash_set_query() {
        let inputs: HashSet<String> = ["Filter".to_string()].into_iter().collect();
        assert!(inputs.is_input_type("Filter"));
        assert!(!inputs.is_input_type("Query"));
    }
}
