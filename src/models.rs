//! Data models for the sales summary.
//!
//! This module contains the row types that flow through the
//! load → coerce → aggregate pipeline and the aggregate result
//! that gets serialized as the output document.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::fmt;

/// A numeric cell as it was found in the source table.
///
/// Ingestion never decides whether a value is usable; it only records
/// what was there. Turning this into a number is the job of
/// [`crate::analysis::coerce`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Text that parsed as a number.
    Number(f64),
    /// Anything else, including the empty string.
    Text(String),
    /// The record was too short to contain this column.
    Missing,
}

impl RawCell {
    /// Tag a raw field from the reader.
    pub fn from_field(field: Option<&str>) -> Self {
        match field {
            None => RawCell::Missing,
            Some(text) => match text.trim().parse::<f64>() {
                Ok(value) => RawCell::Number(value),
                Err(_) => RawCell::Text(text.to_string()),
            },
        }
    }

    /// Tag a raw byte field. Bytes that are not UTF-8 are kept as lossy text
    /// and never parse as a number.
    pub fn from_bytes(field: Option<&[u8]>) -> Self {
        match field {
            None => RawCell::Missing,
            Some(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Self::from_field(Some(text)),
                Err(_) => RawCell::Text(String::from_utf8_lossy(bytes).into_owned()),
            },
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Number(v) => write!(f, "{}", v),
            RawCell::Text(s) => write!(f, "{:?}", s),
            RawCell::Missing => write!(f, "<missing>"),
        }
    }
}

/// One record of the input table, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based source line of the record; the header is line 1.
    pub line: u64,
    /// Grouping key, compared by exact string equality.
    pub product: String,
    pub quantity: RawCell,
    pub unit_price: RawCell,
}

/// A row after coercion. Both numeric fields are always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRow {
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl CleanedRow {
    /// Derived revenue, or `None` when the product overflows to a
    /// non-finite value.
    pub fn checked_revenue(&self) -> Option<f64> {
        Some(self.quantity * self.unit_price).filter(|v| v.is_finite())
    }

    /// Derived revenue for this row. An overflowing product counts as zero.
    pub fn revenue(&self) -> f64 {
        self.checked_revenue().unwrap_or(0.0)
    }
}

/// How products are ordered in the aggregate output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProductOrder {
    /// Order of first appearance in the input (default)
    #[default]
    FirstSeen,
    /// Ascending byte-wise order of the product name
    Alphabetical,
}

impl fmt::Display for ProductOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductOrder::FirstSeen => write!(f, "first-seen"),
            ProductOrder::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

/// Accumulated revenue for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotal {
    pub product: String,
    pub revenue: f64,
    /// Number of input rows that landed in this bucket.
    pub rows: usize,
}

/// Per-product revenue totals in a fixed order.
///
/// Serializes as a JSON object whose keys are product names, in the
/// order the totals are stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    totals: Vec<ProductTotal>,
}

impl AggregateResult {
    pub(crate) fn from_totals(totals: Vec<ProductTotal>) -> Self {
        Self { totals }
    }

    /// Total revenue for a product, if it appeared in the input.
    #[cfg(test)]
    pub fn get(&self, product: &str) -> Option<f64> {
        self.totals
            .iter()
            .find(|t| t.product == product)
            .map(|t| t.revenue)
    }

    /// Product names in output order.
    #[cfg(test)]
    pub fn products(&self) -> Vec<&str> {
        self.totals.iter().map(|t| t.product.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductTotal> {
        self.totals.iter()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Number of input rows accounted for across all buckets.
    pub fn row_count(&self) -> usize {
        self.totals.iter().map(|t| t.rows).sum()
    }

    /// Sum of all product totals.
    pub fn grand_total(&self) -> f64 {
        self.totals.iter().map(|t| t.revenue).sum()
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.totals.len()))?;
        for total in &self.totals {
            // -0.0 + 0.0 == 0.0, so a signed zero never reaches the output
            map.serialize_entry(&total.product, &(total.revenue + 0.0))?;
        }
        map.end()
    }
}

/// Counters collected while processing a table. Logged, never emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Data rows read from the table.
    pub rows: usize,
    /// Distinct products in the result.
    pub products: usize,
    /// Numeric cells that were malformed and coerced to zero.
    pub coerced_cells: usize,
    /// Rows whose revenue overflowed and was counted as zero.
    pub overflowed_rows: usize,
}
