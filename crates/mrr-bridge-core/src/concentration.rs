use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MrrError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MrrResult;

// ---------------------------------------------------------------------------
// Types — Customer Concentration
// ---------------------------------------------------------------------------

/// One customer's total revenue for a single period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRevenue {
    pub customer_id: String,
    pub revenue: Money,
}

/// Input for the revenue concentration analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationInput {
    /// Period label for reporting, e.g. "Q1 2024"
    pub period_name: String,
    pub customers: Vec<CustomerRevenue>,
    /// Tier sizes to report; defaults to [5, 10, 15]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<usize>>,
}

/// Revenue held by the top-N customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationTier {
    pub top_n: usize,
    pub customers: Vec<CustomerRevenue>,
    pub total_revenue: Money,
    /// Percent of all customers' revenue, 0 when the grand total is 0
    pub share_of_total: Rate,
}

/// Distribution statistics across all customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionStats {
    pub customer_count: usize,
    pub total_revenue: Money,
    pub mean_revenue: Money,
    pub median_revenue: Money,
    pub top_customer_revenue: Money,
    pub above_average_count: usize,
}

/// Full concentration analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationOutput {
    pub tiers: Vec<ConcentrationTier>,
    pub stats: DistributionStats,
}

// ---------------------------------------------------------------------------
// Function: analyze_concentration
// ---------------------------------------------------------------------------

const DEFAULT_TIERS: [usize; 3] = [5, 10, 15];

/// Rank customers by revenue and measure how concentrated the book is in the
/// top 5 / 10 / 15 accounts, with distribution statistics across the whole
/// customer base.
///
/// Sorting is stable: customers with equal revenue keep their input order.
pub fn analyze_concentration(
    input: &ConcentrationInput,
) -> MrrResult<ComputationOutput<ConcentrationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.customers.is_empty() {
        return Err(MrrError::EmptyTable(
            "no customers to rank for concentration analysis".to_string(),
        ));
    }

    let mut ranked: Vec<CustomerRevenue> = input.customers.clone();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));

    let total: Decimal = ranked.iter().map(|c| c.revenue).sum();
    if total == dec!(0) {
        warnings.push("Total revenue is zero; all concentration shares reported as 0".to_string());
    }

    let tier_sizes = input
        .tiers
        .clone()
        .unwrap_or_else(|| DEFAULT_TIERS.to_vec());

    let tiers: Vec<ConcentrationTier> = tier_sizes
        .iter()
        .map(|&n| {
            let slice = &ranked[..n.min(ranked.len())];
            let tier_total: Decimal = slice.iter().map(|c| c.revenue).sum();
            let share = if total > dec!(0) {
                (tier_total / total * dec!(100)).round_dp(2)
            } else {
                Decimal::ZERO
            };
            ConcentrationTier {
                top_n: n,
                customers: slice.to_vec(),
                total_revenue: tier_total,
                share_of_total: share,
            }
        })
        .collect();

    let count = ranked.len();
    // Compare against the exact mean; the 2-dp rounding is for reporting only.
    let mean = total / Decimal::from(count as u64);
    let median = if count % 2 == 1 {
        ranked[count / 2].revenue
    } else {
        ((ranked[count / 2 - 1].revenue + ranked[count / 2].revenue) / dec!(2)).round_dp(2)
    };
    let above_average_count = ranked.iter().filter(|c| c.revenue > mean).count();

    let stats = DistributionStats {
        customer_count: count,
        total_revenue: total,
        mean_revenue: mean.round_dp(2),
        median_revenue: median,
        top_customer_revenue: ranked[0].revenue,
        above_average_count,
    };

    let output = ConcentrationOutput { tiers, stats };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Top-N Customer Revenue Concentration Analysis",
        &serde_json::json!({
            "period": input.period_name,
            "customers": input.customers.len(),
            "tiers": tier_sizes,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn customer(id: &str, revenue: Decimal) -> CustomerRevenue {
        CustomerRevenue {
            customer_id: id.to_string(),
            revenue,
        }
    }

    fn basic_input() -> ConcentrationInput {
        ConcentrationInput {
            period_name: "Q1 2024".to_string(),
            customers: vec![
                customer("small", dec!(10)),
                customer("big", dec!(60)),
                customer("mid", dec!(30)),
            ],
            tiers: Some(vec![2]),
        }
    }

    #[test]
    fn test_tier_share_of_total() {
        let result = analyze_concentration(&basic_input()).unwrap();
        let tier = &result.result.tiers[0];
        assert_eq!(tier.top_n, 2);
        assert_eq!(tier.customers[0].customer_id, "big");
        assert_eq!(tier.customers[1].customer_id, "mid");
        assert_eq!(tier.total_revenue, dec!(90));
        assert_eq!(tier.share_of_total, dec!(90.00));
    }

    #[test]
    fn test_tier_larger_than_book_is_clamped() {
        let mut input = basic_input();
        input.tiers = Some(vec![10]);
        let result = analyze_concentration(&input).unwrap();
        let tier = &result.result.tiers[0];
        assert_eq!(tier.customers.len(), 3);
        assert_eq!(tier.share_of_total, dec!(100.00));
    }

    #[test]
    fn test_distribution_stats() {
        let result = analyze_concentration(&basic_input()).unwrap();
        let stats = &result.result.stats;
        assert_eq!(stats.customer_count, 3);
        assert_eq!(stats.total_revenue, dec!(100));
        assert_eq!(stats.mean_revenue, dec!(33.33));
        assert_eq!(stats.median_revenue, dec!(30));
        assert_eq!(stats.top_customer_revenue, dec!(60));
        assert_eq!(stats.above_average_count, 1);
    }

    #[test]
    fn test_even_count_median_averages_middle_pair() {
        let input = ConcentrationInput {
            period_name: "Q1".to_string(),
            customers: vec![
                customer("a", dec!(40)),
                customer("b", dec!(10)),
                customer("c", dec!(20)),
                customer("d", dec!(30)),
            ],
            tiers: None,
        };
        let stats = analyze_concentration(&input).unwrap().result.stats;
        assert_eq!(stats.median_revenue, dec!(25));
    }

    #[test]
    fn test_above_average_uses_exact_mean_not_rounded() {
        // Exact mean is 20.001, which reports as 20.00. A customer at
        // exactly 20.001 is not above the mean, even though it sits above
        // the rounded figure.
        let input = ConcentrationInput {
            period_name: "Q1".to_string(),
            customers: vec![
                customer("edge", dec!(20.001)),
                customer("low", dec!(10)),
                customer("high", dec!(30.002)),
            ],
            tiers: Some(vec![1]),
        };
        let stats = analyze_concentration(&input).unwrap().result.stats;
        assert_eq!(stats.mean_revenue, dec!(20.00));
        assert_eq!(stats.above_average_count, 1);
    }

    #[test]
    fn test_zero_total_reports_zero_shares() {
        let input = ConcentrationInput {
            period_name: "Q1".to_string(),
            customers: vec![customer("a", dec!(0)), customer("b", dec!(0))],
            tiers: Some(vec![1]),
        };
        let result = analyze_concentration(&input).unwrap();
        assert_eq!(result.result.tiers[0].share_of_total, dec!(0));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_equal_revenue_keeps_input_order() {
        let input = ConcentrationInput {
            period_name: "Q1".to_string(),
            customers: vec![customer("first", dec!(50)), customer("second", dec!(50))],
            tiers: Some(vec![2]),
        };
        let tier = &analyze_concentration(&input).unwrap().result.tiers[0];
        assert_eq!(tier.customers[0].customer_id, "first");
    }

    #[test]
    fn test_empty_book_is_an_error() {
        let input = ConcentrationInput {
            period_name: "Q1".to_string(),
            customers: vec![],
            tiers: None,
        };
        assert!(matches!(
            analyze_concentration(&input),
            Err(MrrError::EmptyTable(_))
        ));
    }
}
