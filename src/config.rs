//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sales-summary.toml` files.

use crate::models::ProductOrder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".sales-summary.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input table settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Required column names.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Output document settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// How the input table is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Field delimiter. A single character, or `\t` / `tab`.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Trim surrounding whitespace from every field, product names included.
    #[serde(default)]
    pub trim_fields: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            trim_fields: false,
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// Header names of the three required columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_product_column")]
    pub product: String,

    #[serde(default = "default_quantity_column")]
    pub quantity: String,

    #[serde(default = "default_unit_price_column")]
    pub unit_price: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            product: default_product_column(),
            quantity: default_quantity_column(),
            unit_price: default_unit_price_column(),
        }
    }
}

fn default_product_column() -> String {
    "Product".to_string()
}

fn default_quantity_column() -> String {
    "Quantity".to_string()
}

fn default_unit_price_column() -> String {
    "UnitPrice".to_string()
}

/// Output document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Product ordering in the JSON object.
    #[serde(default)]
    pub order: ProductOrder,

    /// Pretty-print the JSON document.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            order: ProductOrder::default(),
            pretty: true,
        }
    }
}

fn default_true() -> bool {
    true
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
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were explicitly given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(order) = args.order {
            self.output.order = order;
        }

        if let Some(ref delimiter) = args.delimiter {
            self.input.delimiter = delimiter.clone();
        }

        if args.trim_fields {
            self.input.trim_fields = true;
        }

        if args.compact {
            self.output.pretty = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
