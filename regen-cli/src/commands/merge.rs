//! Merge and check commands
//!
//! `regen merge` reconciles a previously generated declaration tree with a
//! freshly generated one and writes the merged tree. `regen check` runs the
//! same merge but only reports breaking-change warnings.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use regen_core::exporter::{json::export_module, ExportConfig};
use regen_core::types::Module;
use regen_core::{merge_modules, Warning, WarningSummary};
use serde::Serialize;

use super::input::{load_module, load_schema};
use crate::config::RegenConfig;
use crate::output::{
    render_warnings, Alignment, Column, Output, OutputConfig, OutputFormat, Outputter,
    TableOutput,
};

/// Options shared by `merge` and `check`.
#[derive(Debug)]
pub struct MergeArgs<'a> {
    pub prev: &'a Path,
    pub next: &'a Path,
    pub schema: Option<&'a str>,
    pub strict: bool,
}

/// Per-kind row of the summary table.
#[derive(Debug, Serialize)]
struct SummaryRow {
    kind: String,
    count: usize,
}

/// Result of a merge or check run.
#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub prev: String,
    pub next: String,
    /// Merged tree, present when it is printed rather than written to a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<Module>,
    pub warnings: Vec<Warning>,
    pub summary: WarningSummary,
    pub declarations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
    pub duration_ms: u64,
}

impl MergeReport {
    fn summary_rows(&self) -> Vec<SummaryRow> {
        self.summary
            .counts
            .iter()
            .map(|(kind, count)| SummaryRow {
                kind: kind.as_str().replace('_', " "),
                count: *count,
            })
            .collect()
    }
}

impl Outputter for MergeReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            "MERGE:".cyan().bold(),
            self.prev.yellow(),
            self.next.green()
        ));
        output.push_str(&format!(
            "{} declarations, {} warnings ({}ms)\n",
            self.declarations,
            if self.warnings.is_empty() {
                "0".green()
            } else {
                self.warnings.len().to_string().red()
            },
            self.duration_ms
        ));

        if let Some(path) = &self.written_to {
            output.push_str(&format!("Merged tree written to {}\n", path.cyan()));
        }

        if self.warnings.is_empty() {
            output.push_str(&format!("\n{}", "No breaking changes detected.".dimmed()));
            return output;
        }

        output.push('\n');
        output.push_str(&render_warnings(&self.warnings, config.use_colors()));
        output.push_str("\n\n");

        let columns = vec![
            Column::new("Warning", "kind").with_max_width(40),
            Column::new("Count", "count").with_alignment(Alignment::Right),
        ];
        output.push_str(&TableOutput::format_with_columns(
            &self.summary_rows(),
            &columns,
            config,
        ));
        output
    }
}

/// Run the merge command
pub fn run(
    args: &MergeArgs<'_>,
    output: Option<&Path>,
    config: &RegenConfig,
    format: OutputFormat,
) -> Result<()> {
    let start = Instant::now();
    let (module, warnings) = merge_files(args, config)?;

    let written_to = match output {
        Some(path) => {
            let json = export_module(&module, &ExportConfig::new(true))
                .context("Failed to serialize merged tree")?;
            fs::write(path, json)
                .with_context(|| format!("Failed to write merged tree: {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote merged tree");
            Some(path.display().to_string())
        }
        None => None,
    };

    let report = MergeReport {
        prev: args.prev.display().to_string(),
        next: args.next.display().to_string(),
        declarations: module.declarations.len(),
        module: match (&written_to, format) {
            (None, OutputFormat::Json) => Some(module),
            _ => None,
        },
        summary: WarningSummary::from_warnings(&warnings),
        warnings,
        written_to,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    finish(report, args.strict, config, format)
}

/// Run the check command: merge, report, write nothing.
pub fn run_check(args: &MergeArgs<'_>, config: &RegenConfig, format: OutputFormat) -> Result<()> {
    let start = Instant::now();
    let (module, warnings) = merge_files(args, config)?;

    let report = MergeReport {
        prev: args.prev.display().to_string(),
        next: args.next.display().to_string(),
        declarations: module.declarations.len(),
        module: None,
        summary: WarningSummary::from_warnings(&warnings),
        warnings,
        written_to: None,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    finish(report, args.strict, config, format)
}

fn merge_files(args: &MergeArgs<'_>, config: &RegenConfig) -> Result<(Module, Vec<Warning>)> {
    let prev = load_module(args.prev)?;
    let next = load_module(args.next)?;
    let schema = load_schema(config.schema_path(args.schema))?;

    let outcome = merge_modules(&prev, &next, &schema).with_context(|| {
        format!(
            "Failed to merge {} with {}",
            args.prev.display(),
            args.next.display()
        )
    })?;
    Ok((outcome.module, outcome.warnings))
}

fn finish(report: MergeReport, strict: bool, config: &RegenConfig, format: OutputFormat) -> Result<()> {
    let count = report.warnings.len();
    Output::new(report, format, config.use_color()).render()?;

    if config.fail_on_warnings(strict) && count > 0 {
        anyhow::bail!("{} breaking-change warning(s) reported", count);
    }
    Ok(())
}
