//! JSON exchange of declaration trees and merge results.
//!
//! The parser and pretty-printer for generated source live outside this
//! crate; they hand trees over as JSON.

pub mod json;

/// Output options shared by the exporters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportConfig {
    pub pretty_print: bool,
}

impl ExportConfig {
    pub fn new(pretty_print: bool) -> Self {
        Self { pretty_print }
    }
}
