//! JSON summary generation.
//!
//! This module renders the aggregate result as the output document and
//! writes it to its destination. The document is always rendered in full
//! before anything is written.

use crate::models::AggregateResult;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Render the aggregate as a JSON object, followed by a newline.
pub fn generate_json_report(result: &AggregateResult, pretty: bool) -> Result<String> {
    let mut output = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    output.push('\n');
    Ok(output)
}

/// Write a rendered document to stdout.
pub fn write_stdout(content: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write summary to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Write a rendered document to a file.
///
/// The content goes to a temporary file in the same directory first and is
/// then renamed over `path`, so readers never observe a half-written file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write summary for {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
