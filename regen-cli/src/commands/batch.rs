//! Batch command - merge many file pairs in parallel
//!
//! Input is a JSON array of `{"path", "prev", "next"}` objects, one per
//! generated file. Merges run on a rayon pool; results are reported in
//! input order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use regen_core::exporter::{json::export_module, json::parse_module_pairs, ExportConfig};
use regen_core::{merge_module_pairs, MergeOutcome, Warning};
use serde::Serialize;

use super::input::load_schema;
use crate::config::RegenConfig;
use crate::output::{
    render_warnings, Alignment, Column, Output, OutputConfig, OutputFormat, Outputter,
    TableOutput,
};

/// Options for `regen batch`.
#[derive(Debug)]
pub struct BatchArgs<'a> {
    pub pairs: &'a Path,
    pub schema: Option<&'a str>,
    pub threads: Option<usize>,
    pub output_dir: Option<&'a Path>,
    pub strict: bool,
}

/// Outcome for one file pair.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub path: String,
    pub status: &'static str,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub source: String,
    pub entries: Vec<BatchEntry>,
    pub total_warnings: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    pub duration_ms: u64,
}

impl Outputter for BatchReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} ({} pairs)\n\n",
            "BATCH:".cyan().bold(),
            self.source.yellow(),
            self.entries.len()
        ));

        let columns = vec![
            Column::new("Path", "path").with_max_width(50),
            Column::new("Status", "status"),
            Column::new("Warnings", "warnings").with_alignment(Alignment::Right),
            Column::new("Error", "error").with_max_width(60),
        ];
        output.push_str(&TableOutput::format_with_columns(
            &self.entries,
            &columns,
            config,
        ));

        let warnings: Vec<Warning> = self
            .entries
            .iter()
            .flat_map(|entry| entry.details.iter().cloned())
            .collect();
        if !warnings.is_empty() {
            output.push_str("\n\n");
            output.push_str(&render_warnings(&warnings, config.use_colors()));
        }

        let mut pairs = vec![
            ("Pairs", self.entries.len().to_string()),
            ("Warnings", self.total_warnings.to_string()),
            ("Failed", self.failed.to_string()),
            ("Duration", format!("{}ms", self.duration_ms)),
        ];
        if let Some(dir) = &self.output_dir {
            pairs.push(("Written to", dir.clone()));
        }
        output.push_str("\n\n");
        output.push_str(&TableOutput::format_key_value(&pairs, config));
        output
    }
}

/// Run the batch command
pub fn run(args: &BatchArgs<'_>, config: &RegenConfig, format: OutputFormat) -> Result<()> {
    let start = Instant::now();

    let json = fs::read_to_string(args.pairs)
        .with_context(|| format!("Failed to read batch input: {}", args.pairs.display()))?;
    let pairs = parse_module_pairs(&json)
        .with_context(|| format!("Failed to parse batch input: {}", args.pairs.display()))?;
    let schema = load_schema(config.schema_path(args.schema))?;
    let threads = config.threads(args.threads);

    tracing::info!(pairs = pairs.len(), ?threads, "Merging batch");
    let results = merge_module_pairs(&pairs, &schema, threads);

    let mut entries = Vec::with_capacity(pairs.len());
    for (pair, result) in pairs.iter().zip(results) {
        let entry = match result {
            Ok(outcome) => {
                if let Some(dir) = args.output_dir {
                    write_merged(dir, &pair.path, &outcome)?;
                }
                BatchEntry {
                    path: pair.path.clone(),
                    status: if outcome.has_warnings() { "warn" } else { "ok" },
                    warnings: outcome.warnings.len(),
                    error: None,
                    details: outcome.warnings,
                }
            }
            Err(err) => BatchEntry {
                path: pair.path.clone(),
                status: "error",
                warnings: 0,
                error: Some(err.to_string()),
                details: Vec::new(),
            },
        };
        entries.push(entry);
    }

    let total_warnings = entries.iter().map(|e| e.warnings).sum();
    let failed = entries.iter().filter(|e| e.error.is_some()).count();

    let report = BatchReport {
        source: args.pairs.display().to_string(),
        entries,
        total_warnings,
        failed,
        output_dir: args.output_dir.map(|d| d.display().to_string()),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    Output::new(report, format, config.use_color()).render()?;

    if failed > 0 {
        anyhow::bail!("{} of {} pair(s) failed to merge", failed, pairs.len());
    }
    if config.fail_on_warnings(args.strict) && total_warnings > 0 {
        anyhow::bail!("{} breaking-change warning(s) reported", total_warnings);
    }
    Ok(())
}

/// Target file for a pair's merged tree. Absolute or parent-relative pair
/// paths are reduced to their file name so output stays inside `dir`.
fn output_path(dir: &Path, pair_path: &str) -> PathBuf {
    let relative = Path::new(pair_path);
    let escapes = relative.is_absolute()
        || relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));

    let target = if escapes {
        dir.join(relative.file_name().unwrap_or(relative.as_os_str()))
    } else {
        dir.join(relative)
    };
    target.with_extension("json")
}

fn write_merged(dir: &Path, pair_path: &str, outcome: &MergeOutcome) -> Result<()> {
    let target = output_path(dir, pair_path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = export_module(&outcome.module, &ExportConfig::new(true))
        .context("Failed to serialize merged tree")?;
    fs::write(&target, json)
        .with_context(|| format!("Failed to write merged tree: {}", target.display()))?;
    tracing::debug!(path = %target.display(), "Wrote merged tree");
    Ok(())
}
