//! Processing strategy module for operation replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing CSV parsing, ledger application and result output. This
//! allows different processing implementations (synchronous, asynchronous
//! batch) to be selected at runtime.

use crate::cli::StrategyType;
use crate::core::traits::UserDirectory;
use crate::io::csv_format::{write_history_csv, write_wallets_csv};
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod replay;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use replay::ReplayEngine;
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy must be able to read operations from a CSV file, apply
/// them through the ledger in submission order, and write the results to
/// output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from input file and write results to output
    ///
    /// Individual operation failures are logged and do not abort the run;
    /// only fatal conditions (unreadable input, output failure) surface as
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the input file cannot be opened, a fatal I/O
    /// error occurs, or a requested history export names an unknown user.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Write the replay results to output
///
/// Default output is the final wallet states; when `export_history` names a
/// user, their transaction history is written instead, in the export
/// projection.
pub(crate) fn write_results(
    engine: &ReplayEngine,
    export_history: Option<&str>,
    output: &mut dyn Write,
) -> Result<(), String> {
    match export_history {
        Some(email) => {
            let user = engine
                .users()
                .find_by_email(email)
                .map_err(|e| format!("Cannot export history: {}", e))?;
            let entries = engine.ledger().history(user.id, &Default::default());
            write_history_csv(&entries, output)
        }
        None => write_wallets_csv(&engine.wallet_rows(), output),
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// Factory selecting the strategy implementation at runtime.
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create
/// * `config` - Optional batch configuration (ignored for sync)
/// * `export_history` - Optional user email whose history is written
///   instead of the final wallet states
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    export_history: Option<String>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(export_history)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, export_history))
        }
    }
}
