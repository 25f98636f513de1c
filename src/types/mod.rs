//! Core data types for the wallet ledger
//!
//! This module contains the domain types used throughout the system:
//! wallets, currency rates, transaction records and the error taxonomy.

pub mod currency;
pub mod error;
pub mod transaction;
pub mod wallet;

pub use currency::{normalize_code, CurrencyRate, RATE_SCALE};
pub use error::LedgerError;
pub use transaction::{Transaction, TransactionId, TransferReceipt, TransferRequest};
pub use wallet::{UserId, Wallet, WalletId};
