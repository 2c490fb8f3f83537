//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::ProductOrder;
use clap::Parser;
use std::path::PathBuf;

/// sales-summary - total revenue per product from a sales table
///
/// Reads a delimited table with Product, Quantity and UnitPrice columns,
/// computes Quantity * UnitPrice per row and prints the per-product totals
/// as a JSON object. Malformed numeric cells count as zero.
///
/// Examples:
///   sales-summary sales.csv
///   sales-summary sales.csv --order alphabetical --output summary.json
///   cat sales.tsv | sales-summary - --delimiter tab
///   sales-summary --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Input table, or `-` to read standard input
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Write the JSON summary to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sales-summary.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Product ordering in the output
    #[arg(long, value_name = "ORDER", env = "SALES_SUMMARY_ORDER")]
    pub order: Option<ProductOrder>,

    /// Field delimiter (single character, or `tab`)
    #[arg(short, long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Trim whitespace around every field, including product names
    #[arg(long)]
    pub trim_fields: bool,

    /// Emit single-line JSON instead of pretty-printed output
    #[arg(long)]
    pub compact: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .sales-summary.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if input.as_os_str() != "-" && input.is_dir() {
                return Err(format!("Input path is a directory: {}", input.display()));
            }
        }

        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!("Output path is a directory: {}", output.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
