//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous implementation of the
//! ProcessingStrategy trait. It reads operations in batches with csv-async
//! and overlaps parsing with application: while one batch applies on a
//! blocking worker, the next batch is already being parsed.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig   (batch_size, max_concurrent_batches)
//!     ├── AsyncReader   (batch CSV reading)
//!     └── ReplayEngine  (shared thread-safe ledger world)
//! ```
//!
//! # Ordering
//!
//! Wallet operations are order-dependent (a transfer depends on the
//! receiver's earlier top-ups and wallet creation), so batches apply
//! sequentially and each batch applies in row order. The concurrency here
//! is pipeline concurrency - parse and apply run at the same time - which
//! keeps results identical to the sync strategy for the same input. The
//! ledger itself is thread-safe, so API callers embedding the crate can
//! still transfer concurrently; the replay deliberately does not.

use crate::io::async_reader::AsyncReader;
use crate::strategy::replay::ReplayEngine;
use crate::strategy::{write_results, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Configuration for batch processing
///
/// Controls how many rows are parsed per batch and how many worker threads
/// the runtime spawns.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Worker threads for the tokio runtime
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                "Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches, default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Parses the operation CSV in batches on a tokio multi-thread runtime
/// while the previous batch is applied to the shared [`ReplayEngine`] on a
/// blocking worker.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,

    /// When set, write this user's history instead of wallet states
    export_history: Option<String>,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    pub fn new(config: BatchConfig, export_history: Option<String>) -> Self {
        Self {
            config,
            export_history,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from input file and write results to output
    ///
    /// 1. Builds a tokio multi-threaded runtime
    /// 2. Streams operation batches from the CSV via AsyncReader
    /// 3. Applies each batch on a blocking worker while parsing the next
    /// 4. Writes the final wallet states (or a history export) to output
    ///
    /// Fatal errors (file not found, runtime errors) are returned
    /// immediately. Individual operation errors are logged and processing
    /// continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let engine = Arc::new(ReplayEngine::new());

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut pending = reader.read_batch(self.config.batch_size).await;
            while !pending.is_empty() {
                let batch_engine = Arc::clone(&engine);
                let batch = std::mem::take(&mut pending);

                // Apply the current batch off the async thread while the
                // next batch parses; the join is the ordering barrier that
                // keeps application sequential.
                let apply = tokio::task::spawn_blocking(move || batch_engine.apply_batch(batch));
                let (next, applied) = tokio::join!(reader.read_batch(self.config.batch_size), apply);
                applied.map_err(|e| format!("Batch application failed: {}", e))?;
                pending = next;
            }

            Ok::<(), String>(())
        })?;

        write_results(&engine, self.export_history.as_deref(), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const HEADER: &str = "op,user,currency,counterparty,to_currency,amount\n";

    #[test]
    fn test_async_strategy_processes_transfer_scenario() {
        let content = format!(
            "{}register,alice@example.com,,,,\n\
             register,bob@example.com,,,,\n\
             rate,,USD,,,1.0\n\
             rate,,INR,,,83.0\n\
             wallet,alice@example.com,USD,,,\n\
             wallet,bob@example.com,INR,,,\n\
             topup,alice@example.com,USD,,,100.00\n\
             transfer,alice@example.com,USD,bob@example.com,INR,10.00\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), None);
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "user,currency,balance\n\
             alice@example.com,USD,90.00\n\
             bob@example.com,INR,830.00\n"
        );
    }

    #[test]
    fn test_async_strategy_maintains_order_across_batches() {
        // A tiny batch size forces the transfer into a later batch than
        // the top-up it depends on.
        let content = format!(
            "{}register,alice@example.com,,,,\n\
             register,bob@example.com,,,,\n\
             rate,,USD,,,1.0\n\
             wallet,alice@example.com,USD,,,\n\
             wallet,bob@example.com,USD,,,\n\
             topup,alice@example.com,USD,,,100.00\n\
             transfer,alice@example.com,USD,bob@example.com,USD,60.00\n\
             transfer,alice@example.com,USD,bob@example.com,USD,40.00\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(2, 2), None);
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "user,currency,balance\n\
             alice@example.com,USD,0.00\n\
             bob@example.com,USD,100.00\n"
        );
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), None);
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_batch_config_zero_values_fall_back() {
        let config = BatchConfig::new(0, 0);
        assert_eq!(config.batch_size, BatchConfig::default().batch_size);
        assert_eq!(
            config.max_concurrent_batches,
            BatchConfig::default().max_concurrent_batches
        );
    }

    #[test]
    fn test_async_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AsyncProcessingStrategy>();
    }
}
