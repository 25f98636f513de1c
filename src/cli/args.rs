use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay wallet operations through the transfer ledger
#[derive(Parser, Debug)]
#[command(name = "wallet-ledger")]
#[command(
    about = "Replay wallet operations (rates, top-ups, transfers) through the ledger",
    long_about = None
)]
pub struct CliArgs {
    /// Input CSV file path containing wallet operations
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy to use for replaying operations
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for synchronous or 'async' for asynchronous"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent batches (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of batches processing concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Write this user's transaction history instead of wallet states
    #[arg(
        long = "export-history",
        value_name = "EMAIL",
        help = "Write the named user's transaction history CSV instead of final wallet states"
    )]
    pub export_history: Option<String>,
}

/// Available processing strategies
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Uses the CLI values when provided and falls back to defaults
    /// otherwise; zero values are rejected with a warning inside
    /// `BatchConfig::new`.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Strategy parsing tests
    #[rstest]
    #[case::default_strategy(&["program", "ops.csv"], StrategyType::Async)]
    #[case::explicit_sync(&["program", "--strategy", "sync", "ops.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "--strategy", "async", "ops.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        match (&parsed.strategy, &expected) {
            (StrategyType::Sync, StrategyType::Sync) => (),
            (StrategyType::Async, StrategyType::Async) => (),
            _ => panic!("Expected {:?}, got {:?}", expected, parsed.strategy),
        }
    }

    // Individual config option tests
    #[rstest]
    #[case::batch_size(&["program", "--batch-size", "2000", "ops.csv"], Some(2000), None)]
    #[case::max_concurrent(&["program", "--max-concurrent", "8", "ops.csv"], None, Some(8))]
    #[case::no_options(&["program", "ops.csv"], None, None)]
    #[case::all_options(
        &["program", "--strategy", "async", "--batch-size", "2000", "--max-concurrent", "8", "ops.csv"],
        Some(2000),
        Some(8)
    )]
    fn test_config_options(
        #[case] args: &[&str],
        #[case] batch_size: Option<usize>,
        #[case] max_concurrent: Option<usize>,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.batch_size, batch_size);
        assert_eq!(parsed.max_concurrent_batches, max_concurrent);
    }

    // BatchConfig conversion tests with valid values
    #[rstest]
    #[case::all_defaults(&["program", "ops.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(&["program", "--batch-size", "2000", "ops.csv"], 2000, num_cpus::get())]
    #[case::custom_max_concurrent(&["program", "--max-concurrent", "8", "ops.csv"], 1000, 8)]
    #[case::all_custom(
        &["program", "--batch-size", "2000", "--max-concurrent", "8", "ops.csv"],
        2000,
        8
    )]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        let config = parsed.to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent_batches, expected_max_concurrent);
    }

    #[test]
    fn test_export_history_option() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--export-history",
            "alice@example.com",
            "ops.csv",
        ])
        .unwrap();
        assert_eq!(
            parsed.export_history.as_deref(),
            Some("alice@example.com")
        );
    }

    // Error handling tests
    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "invalid", "ops.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
