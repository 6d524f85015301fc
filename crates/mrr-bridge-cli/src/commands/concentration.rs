use clap::Args;
use serde_json::Value;

use mrr_bridge_core::aggregate;
use mrr_bridge_core::concentration::{self, ConcentrationInput, CustomerRevenue};

use crate::ingest::{self, cache::LoadCache};
use crate::input;

/// Arguments for the customer concentration analysis
#[derive(Args)]
pub struct ConcentrationArgs {
    /// Path to JSON input file (per-customer period revenue)
    #[arg(long, conflicts_with = "table")]
    pub input: Option<String>,

    /// Path to a CSV revenue table; the opening quarter is analyzed
    #[arg(long)]
    pub table: Option<String>,

    /// Customer identifier column name; auto-detected when omitted
    #[arg(long, requires = "table")]
    pub customer_col: Option<String>,

    /// Tier sizes to report, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [5usize, 10, 15])]
    pub tiers: Vec<usize>,
}

pub fn run_concentration(args: ConcentrationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let c_input: ConcentrationInput = if let Some(ref path) = args.table {
        let mut cache = LoadCache::new();
        let (rows, _labels) = ingest::load_revenue_rows(&mut cache, path, args.customer_col.as_deref())?;
        let customers = aggregate::build_period_revenue(&rows)?
            .into_iter()
            .map(|c| CustomerRevenue {
                customer_id: c.customer_id,
                revenue: c.opening_revenue,
            })
            .collect();
        ConcentrationInput {
            period_name: "Opening Quarter".to_string(),
            customers,
            tiers: Some(args.tiers),
        }
    } else if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(
            "--table <file.csv>, --input <file.json>, or stdin required for concentration".into(),
        );
    };

    let result = concentration::analyze_concentration(&c_input)?;
    Ok(serde_json::to_value(result)?)
}
