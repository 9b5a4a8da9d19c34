use std::path::PathBuf;

use anyhow::Result;
use belegmatch_engine::ReceiptMatcher;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "belegmatch", version, about = "Match receipts to card statement transactions")]
struct Cli {
    /// Matching thresholds and limits (TOML)
    #[arg(short = 'c', long, env = "BELEGMATCH_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Greedily assign receipts to open transactions
    Assign {
        /// JSON array of transactions
        #[arg(short, long)]
        transactions: PathBuf,
        /// JSON array of receipts
        #[arg(short, long)]
        receipts: PathBuf,
    },
    /// Best receipt candidates for one transaction
    Suggest {
        #[arg(short, long)]
        transactions: PathBuf,
        #[arg(short, long)]
        receipts: PathBuf,
        /// Id of the transaction to suggest receipts for
        #[arg(long = "id")]
        transaction_id: i64,
    },
    /// Matched / ambiguous / unmatched report over all transactions
    Reconcile {
        #[arg(short, long)]
        transactions: PathBuf,
        #[arg(short, long)]
        receipts: PathBuf,
    },
    /// Categorize transactions with a rule file
    Categorize {
        #[arg(short, long)]
        transactions: PathBuf,
        /// TOML file of [[rules]] tables
        #[arg(long)]
        rules: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    // stdout carries the JSON result; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    tracing::info!("belegmatch v{} ({config:?})", env!("CARGO_PKG_VERSION"));
    let matcher = ReceiptMatcher::new(config);

    match cli.command {
        Command::Assign { transactions, receipts } => {
            print_json(&commands::assign(&matcher, &transactions, &receipts)?)
        }
        Command::Suggest { transactions, receipts, transaction_id } => print_json(
            &commands::suggest(&matcher, &transactions, &receipts, transaction_id)?,
        ),
        Command::Reconcile { transactions, receipts } => {
            print_json(&commands::reconcile(&matcher, &transactions, &receipts)?)
        }
        Command::Categorize { transactions, rules } => {
            print_json(&commands::categorize(&transactions, &rules)?)
        }
    }
}
