use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, CustomerPeriodRevenue, Money, Rate};
use crate::MrrResult;

// ---------------------------------------------------------------------------
// Types — Revenue Bridge
// ---------------------------------------------------------------------------

/// Customer movement segment between the opening and closing periods.
///
/// Every customer maps to exactly one segment; the five subsets are disjoint
/// and their union is the full customer set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CustomerSegment {
    /// Active in the opening period, zero in the closing period
    Churned,
    /// Zero in the opening period, active in the closing period
    NewCustomer,
    /// Active in both periods, closing > opening
    Expansion,
    /// Active in both periods, closing < opening
    Contraction,
    /// Flat between periods (including the both-zero case)
    Stable,
}

impl std::fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CustomerSegment::Churned => "Churned",
            CustomerSegment::NewCustomer => "New Customer",
            CustomerSegment::Expansion => "Expansion",
            CustomerSegment::Contraction => "Contraction",
            CustomerSegment::Stable => "Stable",
        };
        f.write_str(label)
    }
}

/// Input for the revenue bridge calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeInput {
    /// One entry per distinct customer, already summed per period
    pub customers: Vec<CustomerPeriodRevenue>,
    /// Number of customers in the top expansion / contraction rankings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

/// Aggregate bridge components explaining the opening-to-closing movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeComponents {
    /// Sum of all customers' opening revenue
    pub opening_total: Money,
    /// Sum of all customers' closing revenue
    pub closing_total: Money,
    /// Revenue lost to customers that went to zero (always <= 0)
    pub churn: Money,
    /// Revenue from customers with no opening revenue (always >= 0)
    pub new_customer_revenue: Money,
    /// Signed delta from customers that grew while active in both periods (>= 0)
    pub expansion: Money,
    /// Signed delta from customers that shrank but stayed active (<= 0)
    pub contraction: Money,
    /// closing_total - opening_total
    pub net_change: Money,
    /// (opening + churn + expansion + contraction) / opening; 0 when opening is 0
    pub nrr: Rate,
    /// (opening + churn + contraction) / opening; 0 when opening is 0
    pub grr: Rate,
}

/// Per-customer movement detail for tabular display and segment filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerMovement {
    pub customer_id: String,
    pub opening_revenue: Money,
    pub closing_revenue: Money,
    /// closing - opening
    pub change: Money,
    /// change / opening * 100; defined as 0 when opening is 0
    pub change_pct: Rate,
    pub segment: CustomerSegment,
}

/// Customer counts per segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentCounts {
    pub churned: usize,
    pub new_customers: usize,
    pub expansion: usize,
    pub contraction: usize,
    pub stable: usize,
}

/// One entry in a top-expansion or top-contraction ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMovement {
    pub customer_id: String,
    pub change: Money,
}

/// Full revenue bridge output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeOutput {
    pub components: BridgeComponents,
    pub movements: Vec<CustomerMovement>,
    pub segment_counts: SegmentCounts,
    /// Largest positive deltas among Expansion customers; ties keep input order
    pub top_expansion: Vec<RankedMovement>,
    /// Most negative deltas among Contraction customers; ties keep input order
    pub top_contraction: Vec<RankedMovement>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DEFAULT_TOP_N: usize = 10;

/// Safe ratio: returns Decimal::ZERO when the denominator is zero.
fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == dec!(0) {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

// ---------------------------------------------------------------------------
// Function 1: classify
// ---------------------------------------------------------------------------

/// Classify one customer's movement between the two periods.
///
/// Total over all (opening, closing) pairs, evaluated in priority order so
/// the both-zero case falls through to `Stable`:
/// 1. opening > 0, closing == 0  -> Churned
/// 2. opening == 0, closing > 0  -> NewCustomer
/// 3. closing > opening, opening > 0 -> Expansion
/// 4. closing < opening, closing > 0 -> Contraction
/// 5. otherwise (opening == closing) -> Stable
pub fn classify(opening: Money, closing: Money) -> CustomerSegment {
    let zero = dec!(0);
    if opening > zero && closing == zero {
        CustomerSegment::Churned
    } else if opening == zero && closing > zero {
        CustomerSegment::NewCustomer
    } else if closing > opening && opening > zero {
        CustomerSegment::Expansion
    } else if closing < opening && closing > zero {
        CustomerSegment::Contraction
    } else {
        CustomerSegment::Stable
    }
}

// ---------------------------------------------------------------------------
// Function 2: compute_bridge
// ---------------------------------------------------------------------------

/// Compute the full revenue bridge: aggregate components, NRR/GRR, the
/// per-customer movement table, segment counts, and top expansion /
/// contraction rankings.
///
/// Pure function of its input. Holds the identity
/// `opening_total + churn + expansion + contraction + new_customer_revenue
/// == closing_total` exactly in decimal arithmetic; churn, expansion,
/// contraction, and new-customer revenue fully explain the movement with no
/// residual.
///
/// Negative revenue inputs are not validated here: the aggregate identity
/// still holds arithmetically but segment semantics are not meaningful.
pub fn compute_bridge(input: &BridgeInput) -> MrrResult<ComputationOutput<BridgeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let zero = dec!(0);
    let top_n = input.top_n.unwrap_or(DEFAULT_TOP_N);

    let mut opening_total = Decimal::ZERO;
    let mut closing_total = Decimal::ZERO;
    let mut churn = Decimal::ZERO;
    let mut new_customer_revenue = Decimal::ZERO;
    let mut expansion = Decimal::ZERO;
    let mut contraction = Decimal::ZERO;

    let mut movements: Vec<CustomerMovement> = Vec::with_capacity(input.customers.len());
    let mut counts = SegmentCounts::default();

    for customer in &input.customers {
        let opening = customer.opening_revenue;
        let closing = customer.closing_revenue;
        let change = closing - opening;
        let segment = classify(opening, closing);

        opening_total += opening;
        closing_total += closing;

        match segment {
            CustomerSegment::Churned => {
                churn -= opening;
                counts.churned += 1;
            }
            CustomerSegment::NewCustomer => {
                new_customer_revenue += closing;
                counts.new_customers += 1;
            }
            CustomerSegment::Expansion => {
                expansion += change;
                counts.expansion += 1;
            }
            CustomerSegment::Contraction => {
                contraction += change;
                counts.contraction += 1;
            }
            CustomerSegment::Stable => {
                counts.stable += 1;
            }
        }

        movements.push(CustomerMovement {
            customer_id: customer.customer_id.clone(),
            opening_revenue: opening,
            closing_revenue: closing,
            change,
            change_pct: safe_ratio(change, opening) * dec!(100),
            segment,
        });
    }

    if opening_total == zero && !input.customers.is_empty() {
        warnings.push("Opening total is zero; NRR and GRR reported as 0".to_string());
    }

    let components = BridgeComponents {
        opening_total,
        closing_total,
        churn,
        new_customer_revenue,
        expansion,
        contraction,
        net_change: closing_total - opening_total,
        nrr: safe_ratio(opening_total + churn + expansion + contraction, opening_total),
        grr: safe_ratio(opening_total + churn + contraction, opening_total),
    };

    // Rankings use a stable sort so equal deltas keep input order.
    let mut top_expansion: Vec<RankedMovement> = movements
        .iter()
        .filter(|m| m.segment == CustomerSegment::Expansion)
        .map(|m| RankedMovement {
            customer_id: m.customer_id.clone(),
            change: m.change,
        })
        .collect();
    top_expansion.sort_by(|a, b| b.change.cmp(&a.change));
    top_expansion.truncate(top_n);

    let mut top_contraction: Vec<RankedMovement> = movements
        .iter()
        .filter(|m| m.segment == CustomerSegment::Contraction)
        .map(|m| RankedMovement {
            customer_id: m.customer_id.clone(),
            change: m.change,
        })
        .collect();
    top_contraction.sort_by(|a, b| a.change.cmp(&b.change));
    top_contraction.truncate(top_n);

    let output = BridgeOutput {
        components,
        movements,
        segment_counts: counts,
        top_expansion,
        top_contraction,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Quarter-over-Quarter Revenue Bridge with NRR/GRR Retention Metrics",
        &serde_json::json!({
            "customers": input.customers.len(),
            "top_n": top_n,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
