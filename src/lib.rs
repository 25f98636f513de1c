//! Wallet Ledger Library
//! # Overview
//!
//! A multi-currency wallet and money-transfer ledger: users hold
//! per-currency wallets, transfer funds to each other with on-the-fly
//! currency conversion, and query transaction history and analytics. The
//! crate also ships a CSV replay harness with sync and async strategies.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Wallet, Transaction, CurrencyRate, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - The atomic transfer core
//!   - [`core::wallet_store`] - Wallet arena with scoped atomic primitives
//!   - [`core::rates`] - Concurrent currency rate table
//!   - [`core::convert`] - Pure conversion engine
//!   - [`core::transaction_log`] - Append-only transaction records
//!   - [`core::history`] - History and analytics queries
//! - [`io`] - CSV parsing and output with pluggable reading strategies
//! - [`strategy`] - Sync and async replay pipelines
//!
//! # Transfer semantics
//!
//! A transfer debits the sender's wallet, credits the receiver's wallet
//! with the converted amount (rounded to 2 decimals at persistence), and
//! appends an immutable transaction record - all inside one atomic scope.
//! Balance checks are re-validated under the wallet locks, so concurrent
//! transfers can never jointly overdraw a wallet, and lock acquisition is
//! canonicalized by wallet id to rule out deadlocks.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    AnalyticsSummary, Direction, HistoryEntry, HistoryFilter, InMemoryUserDirectory, Ledger,
    RateTable, TransactionLog, WalletStore,
};
pub use io::{write_history_csv, write_wallets_csv};
pub use types::{
    CurrencyRate, LedgerError, Transaction, TransactionId, TransferReceipt, TransferRequest,
    UserId, Wallet, WalletId,
};
