//! regen CLI - merge regenerated declaration trees and flag breaking changes
//!
//! Compares a previously generated declaration tree with a freshly
//! generated one, keeps hand-written bodies, and reports every change that
//! can break existing clients.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::batch::BatchArgs;
use commands::merge::MergeArgs;
use commands::*;
use config::RegenConfig;
use output::OutputFormat;

/// Merge regenerated code with the previous generation.
///
/// regen keeps user-written function bodies, takes signatures from the new
/// generation, and warns about every change that can break clients.
#[derive(Parser)]
#[command(name = "regen")]
#[command(author, version)]
#[command(about = "Merge regenerated declaration trees and flag breaking changes")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  regen merge prev.json next.json -o merged.json
  regen check prev.json next.json --strict
  regen batch pairs.json --output-dir merged/")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Show detailed version information
    #[arg(long = "version-verbose")]
    version_verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a previous tree with a regenerated one
    #[command(visible_alias = "m")]
    Merge {
        /// Previously generated declaration tree (JSON)
        prev: PathBuf,

        /// Newly generated declaration tree (JSON)
        next: PathBuf,

        /// Schema facts file listing input types
        #[arg(short, long)]
        schema: Option<String>,

        /// Write the merged tree to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with an error when any warning is reported
        #[arg(long)]
        strict: bool,
    },

    /// Report breaking changes without writing anything
    #[command(visible_alias = "c")]
    Check {
        /// Previously generated declaration tree (JSON)
        prev: PathBuf,

        /// Newly generated declaration tree (JSON)
        next: PathBuf,

        /// Schema facts file listing input types
        #[arg(short, long)]
        schema: Option<String>,

        /// Exit with an error when any warning is reported
        #[arg(long)]
        strict: bool,
    },

    /// Merge many file pairs in parallel
    Batch {
        /// JSON array of {"path", "prev", "next"} objects
        pairs: PathBuf,

        /// Schema facts file listing input types
        #[arg(short, long)]
        schema: Option<String>,

        /// Number of worker threads (defaults to number of CPUs)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Write each merged tree under this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Exit with an error when any warning is reported
        #[arg(long)]
        strict: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// Print verbose version information
fn print_verbose_version() {
    use colored::Colorize;

    let cli_version = env!("CARGO_PKG_VERSION");
    let platform = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    println!("regen {}", cli_version);
    println!("  {:<12} {}", "regen-cli:".cyan(), cli_version);
    println!("  {:<12} {}", "regen-core:".cyan(), regen_core::version());
    println!("  {:<12} {}", "Platform:".cyan(), platform);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version_verbose {
        print_verbose_version();
        return Ok(());
    }

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration from .regenrc.toml
    let config = RegenConfig::load(std::path::Path::new("."));

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Merge {
            prev,
            next,
            schema,
            output,
            strict,
        } => {
            let args = MergeArgs {
                prev: &prev,
                next: &next,
                schema: schema.as_deref(),
                strict,
            };
            merge::run(&args, output.as_deref(), &config, format)
        }
        Commands::Check {
            prev,
            next,
            schema,
            strict,
        } => {
            let args = MergeArgs {
                prev: &prev,
                next: &next,
                schema: schema.as_deref(),
                strict,
            };
            merge::run_check(&args, &config, format)
        }
        Commands::Batch {
            pairs,
            schema,
            threads,
            output_dir,
            strict,
        } => {
            let args = BatchArgs {
                pairs: &pairs,
                schema: schema.as_deref(),
                threads,
                output_dir: output_dir.as_deref(),
                strict,
            };
            batch::run(&args, &config, format)
        }
    }
}
