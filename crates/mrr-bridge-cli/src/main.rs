mod commands;
mod ingest;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::bridge::BridgeArgs;
use commands::concentration::ConcentrationArgs;
use commands::quarterly::QuarterlyArgs;

/// Quarterly MRR and revenue-bridge analytics
#[derive(Parser)]
#[command(
    name = "mrrb",
    version,
    about = "Quarterly MRR and revenue-bridge analytics",
    long_about = "A CLI for quarter-over-quarter revenue analytics with decimal precision. \
                  Classifies customer movement (churn, expansion, contraction, new), \
                  derives NRR/GRR retention ratios, and reports quarterly MRR breakdowns \
                  and customer concentration from per-customer monthly revenue tables."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the opening-to-closing revenue bridge with NRR/GRR
    Bridge(BridgeArgs),
    /// Quarterly MRR breakdown by a grouping dimension (Country, Industry, ...)
    Quarterly(QuarterlyArgs),
    /// Top-N customer revenue concentration for the opening quarter
    Concentration(ConcentrationArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Bridge(args) => commands::bridge::run_bridge(args),
        Commands::Quarterly(args) => commands::quarterly::run_quarterly(args),
        Commands::Concentration(args) => commands::concentration::run_concentration(args),
        Commands::Version => {
            println!("mrrb {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
