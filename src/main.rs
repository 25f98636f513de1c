//! Wallet Ledger CLI
//!
//! Command-line interface for replaying wallet operations from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > wallets.csv
//! cargo run -- --strategy sync operations.csv > wallets.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > wallets.csv
//! cargo run -- --export-history alice@example.com operations.csv > history.csv
//! ```
//!
//! The program reads operation rows (user registration, rate ingestion,
//! wallet lifecycle, top-ups, transfers) from the input CSV file, applies
//! them through the ledger using the selected processing strategy, and
//! writes the final wallet states (or one user's transaction history) to
//! stdout. Failed operations are logged and skipped.
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`; control verbosity with
//! `RUST_LOG` (e.g. `RUST_LOG=rust_wallet_ledger=debug`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use rust_wallet_ledger::cli;
use rust_wallet_ledger::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics to stderr; results go to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments using clap
    let args = cli::parse_args();

    // Create the appropriate processing strategy based on CLI arguments
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, args.export_history.clone())
    };

    // Replay operations using the selected strategy; output goes to stdout
    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
