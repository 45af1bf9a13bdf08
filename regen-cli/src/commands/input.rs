//! Loading declaration trees and schema indexes from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regen_core::exporter::json::parse_module;
use regen_core::types::Module;
use regen_core::SchemaIndex;

/// Read and decode a declaration tree from a JSON file.
pub fn load_module(path: &Path) -> Result<Module> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration tree: {}", path.display()))?;
    parse_module(&content)
        .with_context(|| format!("Failed to parse declaration tree: {}", path.display()))
}

/// Load the schema index, or an empty one when no path is configured.
///
/// With an empty index no type counts as an input type, so required-field
/// additions are never reported.
pub fn load_schema(path: Option<&str>) -> Result<SchemaIndex> {
    let Some(path) = path else {
        tracing::debug!("No schema index configured, treating all types as output types");
        return Ok(SchemaIndex::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema index: {}", path))?;
    let schema = SchemaIndex::from_json(&content)
        .with_context(|| format!("Failed to parse schema index: {}", path))?;
    tracing::debug!(path, input_types = schema.input_types.len(), "Loaded schema index");
    Ok(schema)
}
