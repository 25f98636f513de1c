//! Benchmark suite for transfer throughput
//!
//! Compares the synchronous and asynchronous replay strategies on a
//! representative operation mix, and measures the raw ledger transfer path
//! without any CSV parsing in front of it.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use rust_decimal::Decimal;
use rust_wallet_ledger::cli::StrategyType;
use rust_wallet_ledger::core::{
    InMemoryUserDirectory, Ledger, RateTable, SystemClock, TransactionLog, WalletStore,
};
use rust_wallet_ledger::strategy::create_strategy;
use rust_wallet_ledger::types::TransferRequest;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

fn main() {
    divan::main();
}

/// Benchmark synchronous replay of the operation fixture (200 transfers)
#[divan::bench]
fn sync_strategy_replay() {
    let strategy = create_strategy(StrategyType::Sync, None, None);
    let path = Path::new("benches/fixtures/benchmark_transfers.csv");
    let mut output = Vec::new();

    strategy
        .process(path, &mut output)
        .expect("Processing failed");
}

/// Benchmark asynchronous replay of the operation fixture (200 transfers)
#[divan::bench]
fn async_strategy_replay() {
    let strategy = create_strategy(StrategyType::Async, None, None);
    let path = Path::new("benches/fixtures/benchmark_transfers.csv");
    let mut output = Vec::new();

    strategy
        .process(path, &mut output)
        .expect("Processing failed");
}

/// Benchmark the bare ledger transfer path (no CSV in front)
#[divan::bench]
fn ledger_transfers(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| {
            let users = Arc::new(InMemoryUserDirectory::new());
            let alice = users.register("alice@example.com").unwrap().id;
            let bob = users.register("bob@example.com").unwrap().id;

            let rates = Arc::new(RateTable::new());
            rates
                .update_rate("USD", Decimal::from_str("1.0").unwrap())
                .unwrap();
            rates
                .update_rate("INR", Decimal::from_str("83.0").unwrap())
                .unwrap();

            let ledger = Ledger::new(
                Arc::new(WalletStore::new()),
                rates,
                Arc::new(TransactionLog::new()),
                users,
                Arc::new(SystemClock),
            );
            ledger.open_wallet(alice, "USD").unwrap();
            ledger.open_wallet(bob, "INR").unwrap();
            ledger
                .top_up(alice, "USD", Decimal::from_str("100000.00").unwrap())
                .unwrap();
            (ledger, alice)
        })
        .bench_values(|(ledger, alice)| {
            for _ in 0..100 {
                ledger
                    .transfer(TransferRequest {
                        sender: alice,
                        receiver_email: "bob@example.com".to_string(),
                        from_currency: "USD".to_string(),
                        to_currency: "INR".to_string(),
                        amount: Decimal::from_str("1.00").unwrap(),
                    })
                    .expect("transfer failed");
            }
        });
}
