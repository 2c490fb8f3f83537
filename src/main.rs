//! sales-summary - per-product revenue from a sales table
//!
//! A CLI tool that reads a delimited table of sales rows, coerces the
//! Quantity and UnitPrice columns to numbers (malformed cells count as
//! zero), and prints total revenue per product as a JSON object.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Fatal error (missing columns, unreadable table, I/O, bad config)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod table;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::time::Instant;
use table::{InputSource, ReadOptions};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Configuration decides the log level, so it is loaded before logging starts
    let (mut config, config_path) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    debug!("sales-summary v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run(&args, &config) {
        error!("Summary failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .sales-summary.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout is reserved for the JSON document.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Load → coerce → aggregate → emit. Nothing is written unless every
/// stage before emit succeeds.
fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();

    let input = args
        .input
        .as_deref()
        .context("No input table given")?;
    let source = InputSource::from_arg(input);
    let options = ReadOptions::try_from(config)?;

    let rows = table::load_rows(&source, &options)?;

    let (result, stats) = analysis::summarize(&rows, config.output.order)?;
    info!(
        "Aggregated {} row(s) into {} product(s), order: {}",
        stats.rows, stats.products, config.output.order
    );
    for total in result.iter() {
        debug!(
            "{:?}: {} from {} row(s)",
            total.product, total.revenue, total.rows
        );
    }
    debug!("Grand total: {}", result.grand_total());

    let document = report::generate_json_report(&result, config.output.pretty)?;

    match args.output {
        Some(ref path) => {
            report::write_report(&document, path)?;
            info!("Summary written to {}", path.display());
        }
        None => report::write_stdout(&document)?,
    }

    debug!("Finished in {:.3}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Returns the path the configuration was read from, if any.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(DEFAULT_CONFIG_FILE)))),
        None => Ok((Config::default(), None)),
    }
}
