//! Revenue coercion and aggregation.
//!
//! This module holds the only decision logic in the tool: turning untrusted
//! numeric cells into finite numbers, deriving revenue per row and summing it
//! per product.

use crate::error::SummaryError;
use crate::models::{AggregateResult, CleanedRow, ProductOrder, ProductTotal, RawCell, Row, RunStats};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The finite number a cell holds, or `None` if it is malformed, missing or
/// non-finite.
pub fn parse_number(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Number(v) => *v,
        RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
        RawCell::Missing => return None,
    };

    value.is_finite().then_some(value)
}

/// Parse-or-zero.
pub fn coerce(cell: &RawCell) -> f64 {
    parse_number(cell).unwrap_or(0.0)
}

/// Coerce both numeric fields of a row.
pub fn clean(row: &Row) -> CleanedRow {
    CleanedRow {
        product: row.product.clone(),
        quantity: coerce(&row.quantity),
        unit_price: coerce(&row.unit_price),
    }
}

/// Group cleaned rows by product and sum their revenue.
///
/// Rows are summed in input order, so the result is a pure function of the
/// input sequence. A row whose revenue overflows contributes zero; a product
/// total that overflows is an error.
pub fn aggregate(rows: &[CleanedRow], order: ProductOrder) -> Result<AggregateResult, SummaryError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<ProductTotal> = Vec::new();

    for row in rows {
        let slot = *index.entry(row.product.as_str()).or_insert_with(|| {
            totals.push(ProductTotal {
                product: row.product.clone(),
                revenue: 0.0,
                rows: 0,
            });
            totals.len() - 1
        });

        let bucket = &mut totals[slot];
        bucket.revenue += row.revenue();
        bucket.rows += 1;

        if !bucket.revenue.is_finite() {
            return Err(SummaryError::RevenueOverflow {
                product: bucket.product.clone(),
            });
        }
    }

    if order == ProductOrder::Alphabetical {
        totals.sort_by(|a, b| a.product.cmp(&b.product));
    }

    Ok(AggregateResult::from_totals(totals))
}

/// Run the coerce → derive → aggregate stages over a loaded table.
pub fn summarize(
    rows: &[Row],
    order: ProductOrder,
) -> Result<(AggregateResult, RunStats), SummaryError> {
    let mut stats = RunStats {
        rows: rows.len(),
        ..RunStats::default()
    };

    let cleaned: Vec<CleanedRow> = rows
        .iter()
        .map(|row| {
            for (column, cell) in [("quantity", &row.quantity), ("unit price", &row.unit_price)] {
                if parse_number(cell).is_none() {
                    stats.coerced_cells += 1;
                    debug!(
                        "Line {}: {} {} is not a number, using 0",
                        row.line, column, cell
                    );
                }
            }

            let cleaned = clean(row);
            if cleaned.checked_revenue().is_none() {
                stats.overflowed_rows += 1;
                debug!("Line {}: revenue overflows, using 0", row.line);
            }
            cleaned
        })
        .collect();

    let result = aggregate(&cleaned, order)?;
    debug_assert_eq!(result.row_count(), stats.rows);
    stats.products = result.len();

    if stats.coerced_cells > 0 {
        warn!(
            "{} malformed numeric cell(s) coerced to 0 across {} row(s)",
            stats.coerced_cells, stats.rows
        );
    }
    if stats.overflowed_rows > 0 {
        warn!(
            "{} row(s) with overflowing revenue counted as 0",
            stats.overflowed_rows
        );
    }

    Ok((result, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_row(line: u64, product: &str, quantity: &str, unit_price: &str) -> Row {
        Row {
            line,
            product: product.to_string(),
            quantity: RawCell::from_field(Some(quantity)),
            unit_price: RawCell::from_field(Some(unit_price)),
        }
    }

    fn cleaned(product: &str, quantity: f64, unit_price: f64) -> CleanedRow {
        CleanedRow {
            product: product.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_coerce_valid_numbers() {
        assert_eq!(coerce(&RawCell::Number(2.5)), 2.5);
        assert_eq!(coerce(&RawCell::Text(" 4 ".to_string())), 4.0);
        assert_eq!(coerce(&RawCell::Number(-3.0)), -3.0);
    }

    #[test]
    fn test_coerce_malformed_to_zero() {
        assert_eq!(coerce(&RawCell::Text(String::new())), 0.0);
        assert_eq!(coerce(&RawCell::Text("bad".to_string())), 0.0);
        assert_eq!(coerce(&RawCell::Text("1,5".to_string())), 0.0);
        assert_eq!(coerce(&RawCell::Missing), 0.0);
    }

    #[test]
    fn test_coerce_non_finite_to_zero() {
        assert_eq!(coerce(&RawCell::Number(f64::NAN)), 0.0);
        assert_eq!(coerce(&RawCell::Number(f64::INFINITY)), 0.0);
        assert_eq!(coerce(&RawCell::Text("inf".to_string())), 0.0);
        assert_eq!(parse_number(&RawCell::Text("NaN".to_string())), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&RawCell::Number(1.0)), Some(1.0));
        assert_eq!(parse_number(&RawCell::Text("7".to_string())), Some(7.0));
        assert_eq!(parse_number(&RawCell::Text("seven".to_string())), None);
        assert_eq!(parse_number(&RawCell::Missing), None);
    }

    #[test]
    fn test_clean_row() {
        let row = create_test_row(1, "Widget", "bad", "3");
        assert_eq!(clean(&row), cleaned("Widget", 0.0, 3.0));
        assert_eq!(clean(&row).revenue(), 0.0);
    }

    #[test]
    fn test_summarize_mixed_rows() {
        let rows = vec![
            create_test_row(1, "Widget", "10", "2.5"),
            create_test_row(2, "Widget", "bad", "3"),
            create_test_row(3, "Gadget", "5", "4"),
        ];

        let (result, stats) = summarize(&rows, ProductOrder::FirstSeen).unwrap();

        assert_eq!(result.products(), vec!["Widget", "Gadget"]);
        assert_eq!(result.get("Widget"), Some(25.0));
        assert_eq!(result.get("Gadget"), Some(20.0));
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.products, 2);
        assert_eq!(stats.coerced_cells, 1);
    }

    #[test]
    fn test_summarize_empty_cells() {
        let rows = vec![create_test_row(1, "Gizmo", "", "")];

        let (result, stats) = summarize(&rows, ProductOrder::FirstSeen).unwrap();

        assert_eq!(result.get("Gizmo"), Some(0.0));
        assert_eq!(stats.coerced_cells, 2);
    }

    #[test]
    fn test_aggregate_alphabetical_order() {
        let rows = vec![
            cleaned("Widget", 1.0, 1.0),
            cleaned("Gadget", 1.0, 2.0),
            cleaned("Anvil", 1.0, 3.0),
            cleaned("Gadget", 1.0, 2.0),
        ];

        let result = aggregate(&rows, ProductOrder::Alphabetical).unwrap();

        assert_eq!(result.products(), vec!["Anvil", "Gadget", "Widget"]);
        assert_eq!(result.get("Gadget"), Some(4.0));
    }

    #[test]
    fn test_aggregate_every_row_lands_in_one_bucket() {
        let rows = vec![
            cleaned("a", 1.0, 1.0),
            cleaned("b", 0.0, 9.0),
            cleaned("a", 2.0, 2.0),
            cleaned("c", 3.0, 0.0),
            cleaned("b", 1.0, 1.0),
        ];

        let result = aggregate(&rows, ProductOrder::FirstSeen).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.row_count(), rows.len());
        let per_row: f64 = rows.iter().map(CleanedRow::revenue).sum();
        assert!((result.grand_total() - per_row).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_exact_key_equality() {
        let rows = vec![
            cleaned("Widget", 1.0, 1.0),
            cleaned("widget", 1.0, 1.0),
            cleaned("Widget ", 1.0, 1.0),
        ];

        let result = aggregate(&rows, ProductOrder::FirstSeen).unwrap();

        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_aggregate_reordering_within_group() {
        let forward = vec![
            cleaned("Widget", 10.0, 2.5),
            cleaned("Gadget", 5.0, 4.0),
            cleaned("Widget", 2.0, 0.5),
        ];
        let swapped = vec![
            cleaned("Widget", 2.0, 0.5),
            cleaned("Gadget", 5.0, 4.0),
            cleaned("Widget", 10.0, 2.5),
        ];

        let a = aggregate(&forward, ProductOrder::FirstSeen).unwrap();
        let b = aggregate(&swapped, ProductOrder::FirstSeen).unwrap();

        assert_eq!(a.get("Widget"), b.get("Widget"));
        assert_eq!(a.get("Widget"), Some(26.0));
    }

    #[test]
    fn test_negative_values_are_kept() {
        let rows = vec![
            create_test_row(1, "Refund", "-2", "5"),
            create_test_row(2, "Refund", "1", "5"),
        ];

        let (result, stats) = summarize(&rows, ProductOrder::FirstSeen).unwrap();

        assert_eq!(result.get("Refund"), Some(-5.0));
        assert_eq!(stats.coerced_cells, 0);
    }

    #[test]
    fn test_empty_table() {
        let (result, stats) = summarize(&[], ProductOrder::FirstSeen).unwrap();
        assert!(result.is_empty());
        assert_eq!(stats, RunStats::default());
    }

    #[test]
    fn test_overflowing_row_revenue_counts_as_zero() {
        let rows = vec![
            create_test_row(1, "Big", "1e200", "1e200"),
            create_test_row(2, "Mix", "1e308", "10"),
            create_test_row(3, "Mix", "-1e308", "10"),
            create_test_row(4, "Mix", "2", "3"),
        ];

        let (result, stats) = summarize(&rows, ProductOrder::FirstSeen).unwrap();

        assert_eq!(result.get("Big"), Some(0.0));
        assert_eq!(result.get("Mix"), Some(6.0));
        assert_eq!(stats.overflowed_rows, 3);
        assert_eq!(stats.coerced_cells, 0);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"Big":0.0,"Mix":6.0}"#
        );
    }

    #[test]
    fn test_overflowing_product_total_is_an_error() {
        let rows = vec![
            create_test_row(1, "Bulk", "1e308", "1"),
            create_test_row(2, "Bulk", "1e308", "1"),
        ];

        let err = summarize(&rows, ProductOrder::FirstSeen).unwrap_err();

        assert!(matches!(
            err,
            SummaryError::RevenueOverflow { ref product } if product == "Bulk"
        ));
    }
}
