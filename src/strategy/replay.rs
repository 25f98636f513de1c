//! Operation replay engine
//!
//! Wires a complete in-memory world (user directory, rate table, wallet
//! store, transaction log, ledger) and applies typed operations to it.
//! Both processing strategies share this engine: the sync strategy feeds it
//! one operation at a time, the async strategy feeds it parsed batches.
//!
//! Operations are applied in submission order. Wallet operations are
//! order-dependent (a transfer depends on the receiver's earlier top-ups),
//! so the replay never reorders; concurrency in the async pipeline comes
//! from overlapping parsing with application.

use std::sync::Arc;
use tracing::warn;

use crate::core::ledger::Ledger;
use crate::core::rates::RateTable;
use crate::core::traits::{SystemClock, UserDirectory};
use crate::core::transaction_log::TransactionLog;
use crate::core::users::InMemoryUserDirectory;
use crate::core::wallet_store::WalletStore;
use crate::io::csv_format::{Operation, WalletRow};
use crate::types::{LedgerError, TransferRequest};

/// A self-contained ledger world that operations replay into
pub struct ReplayEngine {
    users: Arc<InMemoryUserDirectory>,
    rates: Arc<RateTable>,
    wallets: Arc<WalletStore>,
    ledger: Ledger,
}

impl ReplayEngine {
    /// Create a fresh world with no users, rates or wallets
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserDirectory::new());
        let rates = Arc::new(RateTable::new());
        let wallets = Arc::new(WalletStore::new());
        let log = Arc::new(TransactionLog::new());

        let ledger = Ledger::new(
            Arc::clone(&wallets),
            Arc::clone(&rates),
            log,
            users.clone(),
            Arc::new(SystemClock),
        );

        ReplayEngine {
            users,
            rates,
            wallets,
            ledger,
        }
    }

    /// The ledger this engine replays into
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The user directory backing this world
    pub fn users(&self) -> &InMemoryUserDirectory {
        &self.users
    }

    /// Apply a single operation
    ///
    /// # Errors
    ///
    /// Propagates the ledger error for the failed operation; the engine
    /// state is unchanged by a failed operation.
    pub fn apply(&self, operation: Operation) -> Result<(), LedgerError> {
        match operation {
            Operation::Register { email } => {
                self.users.register(&email)?;
            }
            Operation::Rate { code, rate } => {
                self.rates.update_rate(&code, rate)?;
            }
            Operation::Deactivate { code } => {
                self.rates.set_active(&code, false)?;
            }
            Operation::OpenWallet { email, currency } => {
                let user = self.users.find_by_email(&email)?;
                self.ledger.open_wallet(user.id, &currency)?;
            }
            Operation::CloseWallet { email, currency } => {
                let user = self.users.find_by_email(&email)?;
                self.ledger.close_wallet(user.id, &currency)?;
            }
            Operation::TopUp {
                email,
                currency,
                amount,
            } => {
                let user = self.users.find_by_email(&email)?;
                self.ledger.top_up(user.id, &currency, amount)?;
            }
            Operation::Transfer {
                sender_email,
                from_currency,
                receiver_email,
                to_currency,
                amount,
            } => {
                let sender = self.users.find_by_email(&sender_email)?;
                self.ledger.transfer(TransferRequest {
                    sender: sender.id,
                    receiver_email,
                    from_currency,
                    to_currency,
                    amount,
                })?;
            }
        }
        Ok(())
    }

    /// Apply a batch of operations in order
    ///
    /// Failed operations are logged and skipped; replay always continues
    /// with the next operation.
    pub fn apply_batch(&self, operations: Vec<Operation>) {
        for operation in operations {
            if let Err(e) = self.apply(operation) {
                warn!("Operation failed: {}", e);
            }
        }
    }

    /// Snapshot every wallet as an output row
    pub fn wallet_rows(&self) -> Vec<WalletRow> {
        self.wallets
            .all_wallets()
            .into_iter()
            .map(|wallet| {
                let email = self
                    .users
                    .find_by_id(wallet.owner)
                    .map(|user| user.email)
                    .unwrap_or_else(|_| format!("user-{}", wallet.owner));
                WalletRow {
                    email,
                    currency: wallet.currency,
                    balance: wallet.balance,
                }
            })
            .collect()
    }
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new()
    }
}
