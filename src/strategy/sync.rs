//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of
//! the ProcessingStrategy trait. It orchestrates the replay by coordinating
//! between the SyncReader (for CSV input), the ReplayEngine (for ledger
//! application) and the csv_format output helpers.
//!
//! # Memory Efficiency
//!
//! This strategy maintains streaming behavior: operations are parsed and
//! applied one at a time, so memory usage is O(wallets + transactions),
//! not O(input size).

use crate::io::sync_reader::SyncReader;
use crate::strategy::replay::ReplayEngine;
use crate::strategy::{write_results, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Synchronous processing strategy
///
/// Reads operations sequentially and applies each through the ledger as
/// soon as it parses. Produces identical results to the async strategy for
/// the same input, since both apply operations in submission order.
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    /// When set, write this user's history instead of wallet states
    export_history: Option<String>,
}

impl SyncProcessingStrategy {
    /// Create a new SyncProcessingStrategy
    pub fn new(export_history: Option<String>) -> Self {
        Self { export_history }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process operations from input file and write results to output
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Individual operation errors are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let engine = ReplayEngine::new();

        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(operation) => {
                    if let Err(e) = engine.apply(operation) {
                        warn!("Operation failed: {}", e);
                    }
                }
                Err(e) => {
                    warn!("CSV parsing error: {}", e);
                }
            }
        }

        write_results(&engine, self.export_history.as_deref(), output)
    }
}
