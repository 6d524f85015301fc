use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::MrrError;
use crate::types::{CustomerPeriodRevenue, Money};
use crate::MrrResult;

// ---------------------------------------------------------------------------
// Types — Period Aggregation
// ---------------------------------------------------------------------------

/// Months in the opening period (first quarter of the window).
pub const OPENING_MONTHS: usize = 3;

/// Months in the closing period (second quarter of the window).
pub const CLOSING_MONTHS: usize = 3;

/// Minimum monthly columns required to build both periods.
pub const REQUIRED_MONTHS: usize = OPENING_MONTHS + CLOSING_MONTHS;

/// One raw table row: a customer identifier and its monthly revenue values
/// in chronological order. Non-numeric cells are coerced to zero by the
/// ingestion layer before rows reach the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueRow {
    pub customer_id: String,
    pub months: Vec<Money>,
}

// ---------------------------------------------------------------------------
// Function: build_period_revenue
// ---------------------------------------------------------------------------

/// Collapse raw monthly rows into one `CustomerPeriodRevenue` per distinct
/// customer: opening = sum of the first three months, closing = sum of the
/// next three.
///
/// Rows with a blank or whitespace-only identifier are dropped. Multiple
/// rows sharing an identifier are summed, so the result is invariant under
/// row reordering; output order is first appearance of each identifier.
pub fn build_period_revenue(rows: &[RevenueRow]) -> MrrResult<Vec<CustomerPeriodRevenue>> {
    let mut customers: Vec<CustomerPeriodRevenue> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let id = row.customer_id.trim();
        if id.is_empty() {
            continue;
        }

        if row.months.len() < REQUIRED_MONTHS {
            return Err(MrrError::InsufficientPeriods {
                found: row.months.len(),
                required: REQUIRED_MONTHS,
            });
        }

        let opening: Decimal = row.months[..OPENING_MONTHS].iter().sum();
        let closing: Decimal = row.months[OPENING_MONTHS..REQUIRED_MONTHS].iter().sum();

        match index.get(id) {
            Some(&pos) => {
                customers[pos].opening_revenue += opening;
                customers[pos].closing_revenue += closing;
            }
            None => {
                index.insert(id.to_string(), customers.len());
                customers.push(CustomerPeriodRevenue {
                    customer_id: id.to_string(),
                    opening_revenue: opening,
                    closing_revenue: closing,
                });
            }
        }
    }

    Ok(customers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn row(id: &str, months: Vec<Decimal>) -> RevenueRow {
        RevenueRow {
            customer_id: id.to_string(),
            months,
        }
    }

    #[test]
    fn test_opening_and_closing_windows() {
        let rows = vec![row(
            "Acme",
            vec![dec!(10), dec!(20), dec!(30), dec!(40), dec!(50), dec!(60)],
        )];
        let customers = build_period_revenue(&rows).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].opening_revenue, dec!(60));
        assert_eq!(customers[0].closing_revenue, dec!(150));
    }

    #[test]
    fn test_extra_months_beyond_window_ignored() {
        let rows = vec![row(
            "Acme",
            vec![
                dec!(1),
                dec!(1),
                dec!(1),
                dec!(2),
                dec!(2),
                dec!(2),
                dec!(999),
                dec!(999),
            ],
        )];
        let customers = build_period_revenue(&rows).unwrap();
        assert_eq!(customers[0].opening_revenue, dec!(3));
        assert_eq!(customers[0].closing_revenue, dec!(6));
    }

    #[test]
    fn test_blank_identifiers_dropped() {
        let rows = vec![
            row("", vec![dec!(1); 6]),
            row("   ", vec![dec!(1); 6]),
            row("Real", vec![dec!(1); 6]),
        ];
        let customers = build_period_revenue(&rows).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].customer_id, "Real");
    }

    #[test]
    fn test_duplicate_customers_summed() {
        let rows = vec![
            row("Acme", vec![dec!(5), dec!(5), dec!(5), dec!(1), dec!(1), dec!(1)]),
            row("Other", vec![dec!(2); 6]),
            row("Acme", vec![dec!(1), dec!(1), dec!(1), dec!(3), dec!(3), dec!(3)]),
        ];
        let customers = build_period_revenue(&rows).unwrap();
        assert_eq!(customers.len(), 2);
        // First-seen order is preserved
        assert_eq!(customers[0].customer_id, "Acme");
        assert_eq!(customers[0].opening_revenue, dec!(18));
        assert_eq!(customers[0].closing_revenue, dec!(12));
    }

    #[test]
    fn test_reordering_rows_gives_same_totals() {
        let a = row("A", vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5), dec!(6)]);
        let b = row("A", vec![dec!(6), dec!(5), dec!(4), dec!(3), dec!(2), dec!(1)]);
        let forward = build_period_revenue(&[a.clone(), b.clone()]).unwrap();
        let backward = build_period_revenue(&[b, a]).unwrap();
        assert_eq!(forward[0].opening_revenue, backward[0].opening_revenue);
        assert_eq!(forward[0].closing_revenue, backward[0].closing_revenue);
    }

    #[test]
    fn test_insufficient_months_is_an_error() {
        let rows = vec![row("Acme", vec![dec!(1); 5])];
        let err = build_period_revenue(&rows).unwrap_err();
        match err {
            MrrError::InsufficientPeriods { found, required } => {
                assert_eq!(found, 5);
                assert_eq!(required, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input_is_fine() {
        let customers = build_period_revenue(&[]).unwrap();
        assert!(customers.is_empty());
    }
}
