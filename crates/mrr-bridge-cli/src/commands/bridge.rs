use clap::Args;
use serde_json::Value;

use mrr_bridge_core::aggregate;
use mrr_bridge_core::bridge::{self, BridgeInput};

use crate::ingest::{self, cache::LoadCache};
use crate::input;

/// Arguments for the revenue bridge calculation
#[derive(Args)]
pub struct BridgeArgs {
    /// Path to JSON input file (pre-aggregated per-customer periods)
    #[arg(long, conflicts_with = "table")]
    pub input: Option<String>,

    /// Path to a CSV revenue table (one customer per row, monthly columns)
    #[arg(long)]
    pub table: Option<String>,

    /// Customer identifier column name; auto-detected when omitted
    #[arg(long, requires = "table")]
    pub customer_col: Option<String>,

    /// Ranking size for top expansion / contraction customers
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub fn run_bridge(args: BridgeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bridge_input: BridgeInput = if let Some(ref path) = args.table {
        let mut cache = LoadCache::new();
        let (rows, _labels) = ingest::load_revenue_rows(&mut cache, path, args.customer_col.as_deref())?;
        let customers = aggregate::build_period_revenue(&rows)?;
        BridgeInput {
            customers,
            top_n: Some(args.top),
        }
    } else if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--table <file.csv>, --input <file.json>, or stdin required for bridge".into());
    };

    let result = bridge::compute_bridge(&bridge_input)?;
    Ok(serde_json::to_value(result)?)
}
