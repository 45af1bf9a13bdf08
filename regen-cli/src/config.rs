//! regen configuration loading from `.regenrc.toml`.
//!
//! Configuration is optional; regen uses sensible defaults if no config file
//! exists. Command-line flags override anything set here.
//!
//! # Example Configuration
//!
//! ```toml
//! [merge]
//! fail_on_warnings = false
//! schema = "schema-index.json"
//! threads = 4
//!
//! [output]
//! format = "table"
//! color = true
//! ```

use serde::Deserialize;
use std::path::Path;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = ".regenrc.toml";

/// Root configuration structure loaded from `.regenrc.toml`.
///
/// All sections are optional and will use defaults if not specified.
#[derive(Debug, Deserialize, Default)]
pub struct RegenConfig {
    /// Merge behavior.
    #[serde(default)]
    pub merge: MergeSettings,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Merge behavior settings.
#[derive(Debug, Deserialize, Default)]
pub struct MergeSettings {
    /// Exit with an error when a merge reports any warning.
    ///
    /// Same effect as passing `--strict`. Default: `false`
    #[serde(default)]
    pub fail_on_warnings: bool,

    /// Path to the schema index JSON (`{"input_types": [...]}`).
    ///
    /// Used when `--schema` is not given. Relative paths resolve against
    /// the working directory.
    #[serde(default)]
    pub schema: Option<String>,

    /// Worker threads for `regen batch`. Default: number of CPUs
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Output formatting preferences.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table` or `json`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output.
    ///
    /// Defaults to `true` when stdout is a TTY.
    #[serde(default)]
    pub color: Option<bool>,
}

impl RegenConfig {
    /// Load configuration from `.regenrc.toml` in the given directory.
    ///
    /// If the config file doesn't exist or can't be parsed, returns defaults.
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured color preference, or `None` to auto-detect.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }

    /// Whether warnings should fail the command, given the `--strict` flag.
    pub fn fail_on_warnings(&self, strict: bool) -> bool {
        strict || self.merge.fail_on_warnings
    }

    /// Schema index path: the CLI flag wins over the config file.
    pub fn schema_path<'a>(&'a self, flag: Option<&'a str>) -> Option<&'a str> {
        flag.or(self.merge.schema.as_deref())
    }

    /// Worker thread count: the CLI flag wins over the config file.
    pub fn threads(&self, flag: Option<usize>) -> Option<usize> {
        flag.or(self.merge.threads)
    }
}
