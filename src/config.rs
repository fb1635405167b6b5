//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.rmcompare.toml` files.

use crate::analysis::AggregateError;
use crate::models::{
    ReportSchema, GC_CONTENT_COLUMN, HEADER_SENTINEL, PERCENTAGE_CEILING, PERCENTAGE_DECIMALS,
    REPEATMASKER_PERCENTAGE_COLUMNS, REPEATMASKER_VALUE_COLUMNS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".rmcompare.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report column layout.
    #[serde(default)]
    pub schema: SchemaConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output table path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "repeatmasker_comparison.tsv".to_string()
}

/// Column layout of the per-scaffold reports.
///
/// Positions count the identifier column as 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Leading text of header lines.
    #[serde(default = "default_header_sentinel")]
    pub header_sentinel: String,

    /// Number of value columns after the identifier.
    #[serde(default = "default_value_columns")]
    pub value_columns: usize,

    /// Positions holding percentages of the preceding column.
    #[serde(default = "default_percentage_columns")]
    pub percentage_columns: Vec<usize>,

    /// Percentage positions left as weighted sums (GC content).
    #[serde(default = "default_unscaled_columns")]
    pub unscaled_columns: Vec<usize>,

    /// Largest accepted percentage value.
    #[serde(default = "default_percentage_ceiling")]
    pub percentage_ceiling: f64,

    /// Decimal places kept for percentages.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            header_sentinel: default_header_sentinel(),
            value_columns: default_value_columns(),
            percentage_columns: default_percentage_columns(),
            unscaled_columns: default_unscaled_columns(),
            percentage_ceiling: default_percentage_ceiling(),
            decimals: default_decimals(),
        }
    }
}

fn default_header_sentinel() -> String {
    HEADER_SENTINEL.to_string()
}

fn default_value_columns() -> usize {
    REPEATMASKER_VALUE_COLUMNS
}

fn default_percentage_columns() -> Vec<usize> {
    REPEATMASKER_PERCENTAGE_COLUMNS.to_vec()
}

fn default_unscaled_columns() -> Vec<usize> {
    vec![GC_CONTENT_COLUMN]
}

fn default_percentage_ceiling() -> f64 {
    PERCENTAGE_CEILING
}

fn default_decimals() -> u32 {
    PERCENTAGE_DECIMALS
}

impl SchemaConfig {
    /// Validate the layout and build the schema used by the aggregator.
    pub fn to_schema(&self) -> Result<ReportSchema, AggregateError> {
        ReportSchema::new(
            &self.header_sentinel,
            self.value_columns,
            &self.percentage_columns,
            &self.unscaled_columns,
            self.percentage_ceiling,
            self.decimals,
        )
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load `.rmcompare.toml` from `dir` if present.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
