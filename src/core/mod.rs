//! Business logic components for the wallet ledger
//!
//! This module contains the core components:
//!
//! - [`ledger`] - The atomic transfer core and its exposed operations
//! - [`wallet_store`] - Wallet arena with scoped atomic mutation primitives
//! - [`rates`] - Concurrent currency rate table
//! - [`convert`] - Pure currency conversion engine
//! - [`transaction_log`] - Append-only transaction record store
//! - [`history`] - Read-only history and analytics queries
//! - [`traits`] - Collaborator traits (user directory, clock)
//! - [`users`] - In-memory user directory implementation

pub mod convert;
pub mod history;
pub mod ledger;
pub mod rates;
pub mod traits;
pub mod transaction_log;
pub mod users;
pub mod wallet_store;

pub use convert::{convert, round_to_cents};
pub use history::{AnalyticsSummary, Direction, HistoryEntry, HistoryFilter};
pub use ledger::Ledger;
pub use rates::RateTable;
pub use traits::{Clock, FixedClock, SystemClock, UserDirectory};
pub use transaction_log::TransactionLog;
pub use users::{InMemoryUserDirectory, User};
pub use wallet_store::WalletStore;
