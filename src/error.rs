//! Structural error taxonomy.
//!
//! Only failures that make the input unusable as a whole, or that leave no
//! finite total to report, live here.
//! Per-cell value problems never surface as errors; they are coerced
//! to zero in [`crate::analysis`].

use std::path::PathBuf;
use thiserror::Error;

/// A fatal failure. The run aborts before any output is written.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// One or more required header columns are absent.
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The reader could not interpret the input as a delimited table.
    #[error("input is not a readable table (record {record}): {source}")]
    Malformed {
        record: u64,
        #[source]
        source: csv::Error,
    },

    /// The input could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A product's summed revenue no longer fits in a finite number.
    #[error("revenue total for product {product:?} overflows")]
    RevenueOverflow { product: String },

    /// Delimiters must be a single ASCII character.
    #[error("invalid delimiter {0:?}: expected a single ASCII character")]
    InvalidDelimiter(String),
}
