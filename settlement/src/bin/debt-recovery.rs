//! Debt recovery batch binary
//!
//! Reads `{ "debts": [...], "settlements": [...] }`, collects debts from the
//! settlements for the given date and prints the updated records as JSON.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use settlement::{
    Config, DebtBook, DebtRecoveryEngine, OperatingDebt, RecoveryReport, Settlement,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Debug, Parser)]
#[command(name = "debt-recovery", about = "Collect operating debts from merchant settlements")]
struct Args {
    /// JSON batch file
    #[arg(short, long)]
    input: PathBuf,

    /// TOML configuration file (defaults plus environment overrides when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Business date, YYYY-MM-DD (default: today, UTC)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Deserialize)]
struct BatchInput {
    #[serde(default)]
    debts: Vec<OperatingDebt>,
    #[serde(default)]
    settlements: Vec<Settlement>,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    report: RecoveryReport,
    debts: Vec<OperatingDebt>,
    settlements: Vec<Settlement>,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let input: BatchInput = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let today = args.date.unwrap_or_else(|| Utc::now().date_naive());
    tracing::info!(
        service = %config.service_name,
        date = %today,
        debts = input.debts.len(),
        settlements = input.settlements.len(),
        "Starting debt recovery"
    );

    let book = Arc::new(DebtBook::new()?);
    for debt in input.debts {
        let id = debt.id;
        book.insert(debt).with_context(|| format!("loading debt {}", id))?;
    }

    let engine = DebtRecoveryEngine::new(Arc::clone(&book), config.recovery);
    let mut settlements = input.settlements;
    let report = engine.run(&mut settlements, today);

    let output = BatchOutput {
        report,
        debts: book.snapshot(),
        settlements,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}
