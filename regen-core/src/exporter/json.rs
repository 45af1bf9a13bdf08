//! JSON format exporter.

use serde::Serialize;

use crate::error::Result;
use crate::exporter::ExportConfig;
use crate::merge::{MergeOutcome, ModulePair};
use crate::types::Module;
use crate::warning::Warning;

fn export<T: Serialize + ?Sized>(value: &T, config: &ExportConfig) -> Result<String> {
    let json = if config.pretty_print {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Export a declaration tree.
pub fn export_module(module: &Module, config: &ExportConfig) -> Result<String> {
    export(module, config)
}

/// Export warnings in traversal order.
pub fn export_warnings(warnings: &[Warning], config: &ExportConfig) -> Result<String> {
    export(warnings, config)
}

/// Export a merged tree together with its warnings and per-kind summary.
pub fn export_outcome(outcome: &MergeOutcome, config: &ExportConfig) -> Result<String> {
    #[derive(Serialize)]
    struct Report<'a> {
        module: &'a Module,
        warnings: &'a [Warning],
        summary: crate::warning::WarningSummary,
    }

    export(
        &Report {
            module: &outcome.module,
            warnings: &outcome.warnings,
            summary: outcome.summary(),
        },
        config,
    )
}

/// Decode a declaration tree.
pub fn parse_module(json: &str) -> Result<Module> {
    Ok(serde_json::from_str(json)?)
}

/// Decode a batch of file pairs: `[{"path": .., "prev": .., "next": ..}]`.
pub fn parse_module_pairs(json: &str) -> Result<Vec<ModulePair>> {
    Ok(serde_json::from_str(json)?)
}
