use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::error::MrrError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MrrResult;

// ---------------------------------------------------------------------------
// Types — Quarterly MRR Breakdown
// ---------------------------------------------------------------------------

/// One raw table row keyed by a grouping dimension value (e.g. a country or
/// an industry), with monthly revenue in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedRow {
    pub group: String,
    pub months: Vec<Money>,
}

/// Input for the quarterly MRR breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterlyInput {
    /// Dimension label, e.g. "Country" or "Industry" (reporting only)
    pub dimension: String,
    pub rows: Vec<GroupedRow>,
    /// Month column labels; generated as "M1".. when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_labels: Option<Vec<String>>,
}

/// Quarterly totals and percentage shares for one dimension value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupQuarterly {
    pub group: String,
    /// Q1..Q4 totals, 2 dp; quarters with no month data are 0
    pub quarters: Vec<Money>,
    /// Share of each quarter's overall total, in percent, 2 dp
    pub shares: Vec<Rate>,
}

/// One month's total with month-over-month growth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub label: String,
    pub total_mrr: Money,
    /// Percent growth vs the prior month; None for the first month or a
    /// zero prior month (rendered as "n/a" downstream)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mom_growth_pct: Option<Rate>,
}

/// Full quarterly breakdown output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterlyOutput {
    pub quarter_labels: Vec<String>,
    pub quarter_totals: Vec<Money>,
    pub groups: Vec<GroupQuarterly>,
    pub monthly: Vec<MonthlyTotal>,
}

// ---------------------------------------------------------------------------
// Function: analyze_quarterly
// ---------------------------------------------------------------------------

const MONTHS_PER_QUARTER: usize = 3;
const MAX_MONTHS: usize = 12;

/// Aggregate monthly rows into quarterly MRR per dimension value, with
/// per-quarter percentage shares and a monthly total / MoM-growth series.
///
/// Only the first twelve months feed the quarters; quarters whose months are
/// absent report 0. Rows with a blank group value are dropped and duplicate
/// group values are summed, as in the period aggregator.
pub fn analyze_quarterly(input: &QuarterlyInput) -> MrrResult<ComputationOutput<QuarterlyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let month_count = input
        .rows
        .iter()
        .map(|r| r.months.len())
        .max()
        .unwrap_or(0);
    if month_count == 0 {
        return Err(MrrError::InvalidInput {
            field: "rows".to_string(),
            reason: "no monthly revenue columns".to_string(),
        });
    }

    // Group and sum rows by dimension value, first-seen order.
    let mut groups: Vec<(String, Vec<Decimal>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in &input.rows {
        let key = row.group.trim();
        if key.is_empty() {
            continue;
        }
        let pos = match index.get(key) {
            Some(&pos) => pos,
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push((key.to_string(), vec![Decimal::ZERO; month_count]));
                groups.len() - 1
            }
        };
        for (i, value) in row.months.iter().enumerate() {
            groups[pos].1[i] += *value;
        }
    }

    if groups.is_empty() {
        return Err(MrrError::EmptyTable(format!(
            "no rows with a non-blank {} value",
            input.dimension
        )));
    }

    let usable_months = month_count.min(MAX_MONTHS);
    if month_count > MAX_MONTHS {
        warnings.push(format!(
            "Found {month_count} monthly columns; only the first {MAX_MONTHS} feed the quarters"
        ));
    }
    let quarter_count = 4;
    let quarter_labels: Vec<String> = (1..=quarter_count).map(|q| format!("Q{q}")).collect();

    // Per-group quarterly totals.
    let mut group_quarters: Vec<(String, Vec<Decimal>)> = groups
        .iter()
        .map(|(name, months)| {
            let quarters: Vec<Decimal> = (0..quarter_count)
                .map(|q| {
                    let lo = (q * MONTHS_PER_QUARTER).min(usable_months);
                    let hi = ((q + 1) * MONTHS_PER_QUARTER).min(usable_months);
                    months[lo..hi].iter().sum::<Decimal>().round_dp(2)
                })
                .collect();
            (name.clone(), quarters)
        })
        .collect();

    let quarter_totals: Vec<Decimal> = (0..quarter_count)
        .map(|q| group_quarters.iter().map(|(_, qs)| qs[q]).sum())
        .collect();

    let output_groups: Vec<GroupQuarterly> = group_quarters
        .drain(..)
        .map(|(group, quarters)| {
            let shares: Vec<Decimal> = quarters
                .iter()
                .zip(&quarter_totals)
                .map(|(value, total)| {
                    if *total > dec!(0) {
                        (value / total * dec!(100)).round_dp(2)
                    } else {
                        Decimal::ZERO
                    }
                })
                .collect();
            GroupQuarterly {
                group,
                quarters,
                shares,
            }
        })
        .collect();

    // Monthly totals across all groups, with MoM growth.
    let labels: Vec<String> = match &input.month_labels {
        Some(labels) if labels.len() >= month_count => labels[..month_count].to_vec(),
        _ => (1..=month_count).map(|m| format!("M{m}")).collect(),
    };

    let mut monthly: Vec<MonthlyTotal> = Vec::with_capacity(month_count);
    let mut prior: Option<Decimal> = None;
    for (i, label) in labels.iter().enumerate() {
        let total: Decimal = groups
            .iter()
            .map(|(_, months)| months.get(i).copied().unwrap_or(Decimal::ZERO))
            .sum();
        let mom_growth_pct = match prior {
            Some(p) if p != dec!(0) => Some(((total - p) / p * dec!(100)).round_dp(2)),
            _ => None,
        };
        monthly.push(MonthlyTotal {
            label: label.clone(),
            total_mrr: total.round_dp(2),
            mom_growth_pct,
        });
        prior = Some(total);
    }

    let output = QuarterlyOutput {
        quarter_labels,
        quarter_totals,
        groups: output_groups,
        monthly,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Quarterly MRR Breakdown by Dimension with MoM Growth",
        &serde_json::json!({
            "dimension": input.dimension,
            "rows": input.rows.len(),
            "monthly_columns": month_count,
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

    fn grouped(group: &str, months: Vec<Decimal>) -> GroupedRow {
        GroupedRow {
            group: group.to_string(),
            months,
        }
    }

    fn basic_input() -> QuarterlyInput {
        QuarterlyInput {
            dimension: "Country".to_string(),
            rows: vec![
                grouped("US", vec![dec!(10), dec!(10), dec!(10), dec!(20), dec!(20), dec!(20)]),
                grouped("UK", vec![dec!(30), dec!(30), dec!(30), dec!(20), dec!(20), dec!(20)]),
            ],
            month_labels: None,
        }
    }

    #[test]
    fn test_quarterly_totals_per_group() {
        let result = analyze_quarterly(&basic_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.groups[0].group, "US");
        assert_eq!(out.groups[0].quarters, vec![dec!(30), dec!(60), dec!(0), dec!(0)]);
        assert_eq!(out.groups[1].quarters, vec![dec!(90), dec!(60), dec!(0), dec!(0)]);
        assert_eq!(out.quarter_totals, vec![dec!(120), dec!(120), dec!(0), dec!(0)]);
    }

    #[test]
    fn test_quarterly_shares_sum_to_hundred() {
        let result = analyze_quarterly(&basic_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.groups[0].shares[0], dec!(25.00));
        assert_eq!(out.groups[1].shares[0], dec!(75.00));
        // Empty quarters report a 0 share, never a division error
        assert_eq!(out.groups[0].shares[3], dec!(0));
    }

    #[test]
    fn test_duplicate_groups_summed_and_blanks_dropped() {
        let input = QuarterlyInput {
            dimension: "Industry".to_string(),
            rows: vec![
                grouped("SaaS", vec![dec!(1); 6]),
                grouped("  ", vec![dec!(100); 6]),
                grouped("SaaS", vec![dec!(2); 6]),
            ],
            month_labels: None,
        };
        let result = analyze_quarterly(&input).unwrap();
        let out = &result.result;
        assert_eq!(out.groups.len(), 1);
        assert_eq!(out.groups[0].quarters[0], dec!(9));
    }

    #[test]
    fn test_monthly_totals_and_mom_growth() {
        let result = analyze_quarterly(&basic_input()).unwrap();
        let monthly = &result.result.monthly;
        assert_eq!(monthly.len(), 6);
        assert_eq!(monthly[0].total_mrr, dec!(40));
        assert_eq!(monthly[0].mom_growth_pct, None);
        // Month 4: 40 -> 40, flat
        assert_eq!(monthly[3].total_mrr, dec!(40));
        assert_eq!(monthly[3].mom_growth_pct, Some(dec!(0.00)));
    }

    #[test]
    fn test_mom_growth_after_zero_month_is_none() {
        let input = QuarterlyInput {
            dimension: "Country".to_string(),
            rows: vec![grouped("US", vec![dec!(0), dec!(50), dec!(100)])],
            month_labels: Some(vec!["Jan".into(), "Feb".into(), "Mar".into()]),
        };
        let monthly = analyze_quarterly(&input).unwrap().result.monthly;
        assert_eq!(monthly[1].mom_growth_pct, None);
        assert_eq!(monthly[2].mom_growth_pct, Some(dec!(100.00)));
        assert_eq!(monthly[2].label, "Mar");
    }

    #[test]
    fn test_thirteenth_month_excluded_with_warning() {
        let input = QuarterlyInput {
            dimension: "Country".to_string(),
            rows: vec![grouped("US", vec![dec!(1); 13])],
            month_labels: None,
        };
        let result = analyze_quarterly(&input).unwrap();
        assert_eq!(result.result.quarter_totals.iter().sum::<Decimal>(), dec!(12));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_no_months_is_invalid_input() {
        let input = QuarterlyInput {
            dimension: "Country".to_string(),
            rows: vec![grouped("US", vec![])],
            month_labels: None,
        };
        assert!(matches!(
            analyze_quarterly(&input),
            Err(MrrError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_all_blank_groups_is_empty_table() {
        let input = QuarterlyInput {
            dimension: "Country".to_string(),
            rows: vec![grouped("", vec![dec!(1); 6])],
            month_labels: None,
        };
        assert!(matches!(
            analyze_quarterly(&input),
            Err(MrrError::EmptyTable(_))
        ));
    }
}
