use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and retention ratios expressed as decimals (1.0 = 100%).
pub type Rate = Decimal;

/// One customer's revenue over the two fixed analysis periods.
///
/// Both revenues are always defined and non-negative: the aggregator
/// normalizes missing or non-numeric cells to zero before the engine runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPeriodRevenue {
    /// Opaque stable identifier, unique within a run
    pub customer_id: String,
    /// Total revenue in the opening period (sum of its constituent months)
    pub opening_revenue: Money,
    /// Total revenue in the closing period
    pub closing_revenue: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
