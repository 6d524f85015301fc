use clap::Args;
use serde_json::Value;

use mrr_bridge_core::quarterly::{self, QuarterlyInput};

use crate::ingest::{self, cache::LoadCache};
use crate::input;

/// Arguments for the quarterly MRR breakdown
#[derive(Args)]
pub struct QuarterlyArgs {
    /// Path to JSON input file (pre-grouped monthly rows)
    #[arg(long, conflicts_with = "table")]
    pub input: Option<String>,

    /// Path to a CSV revenue table
    #[arg(long)]
    pub table: Option<String>,

    /// Grouping dimension column, e.g. "Country" or "Industry"
    #[arg(long, default_value = "Country")]
    pub group_by: String,
}

pub fn run_quarterly(args: QuarterlyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let q_input: QuarterlyInput = if let Some(ref path) = args.table {
        let mut cache = LoadCache::new();
        let (rows, labels) = ingest::load_grouped_rows(&mut cache, path, &args.group_by)?;
        QuarterlyInput {
            dimension: args.group_by,
            rows,
            month_labels: Some(labels),
        }
    } else if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(
            "--table <file.csv>, --input <file.json>, or stdin required for quarterly".into(),
        );
    };

    let result = quarterly::analyze_quarterly(&q_input)?;
    Ok(serde_json::to_value(result)?)
}
