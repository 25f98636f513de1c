//! Append-only transaction log
//!
//! This module provides the `TransactionLog`, the immutable record store
//! behind history and analytics. Entries are created exactly once, inside
//! the same atomic scope as the balance mutations they document, and are
//! never updated or deleted.
//!
//! # Design
//!
//! A `RwLock<Vec<Transaction>>` keeps appends cheap and lets history and
//! analytics take consistent snapshots without blocking each other. There
//! is deliberately no mutation API beyond `append`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::types::{Transaction, WalletId};

/// Append-only store of completed transfers
#[derive(Debug)]
pub struct TransactionLog {
    /// Recorded transfers in append order
    entries: RwLock<Vec<Transaction>>,

    /// Next transaction id to assign
    next_id: AtomicU64,
}

impl TransactionLog {
    /// Create a new empty log
    pub fn new() -> Self {
        TransactionLog {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a transfer record
    ///
    /// Assigns the next transaction id and stores the entry. Infallible by
    /// construction so it can run as the final step of an atomic commit.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &self,
        sender_wallet_id: WalletId,
        receiver_wallet_id: WalletId,
        amount_sent: Decimal,
        amount_received: Decimal,
        from_currency: &str,
        to_currency: &str,
        created_at: DateTime<Utc>,
    ) -> Transaction {
        let transaction = Transaction {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            sender_wallet_id,
            receiver_wallet_id,
            amount_sent,
            amount_received,
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
            created_at,
        };

        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(transaction.clone());

        transaction
    }

    /// Take a snapshot of all recorded transactions in append order
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of recorded transactions
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_append(log: &TransactionLog, sender: WalletId, receiver: WalletId) -> Transaction {
        log.append(
            sender,
            receiver,
            Decimal::new(1000, 2),
            Decimal::new(83000, 2),
            "USD",
            "INR",
            Utc::now(),
        )
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let log = TransactionLog::new();

        let first = sample_append(&log, 1, 2);
        let second = sample_append(&log, 2, 1);

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_append_captures_currency_codes_at_transfer_time() {
        let log = TransactionLog::new();
        let recorded = sample_append(&log, 1, 2);

        assert_eq!(recorded.from_currency, "USD");
        assert_eq!(recorded.to_currency, "INR");
        assert_eq!(recorded.amount_sent, Decimal::new(1000, 2));
        assert_eq!(recorded.amount_received, Decimal::new(83000, 2));
    }

    #[test]
    fn test_snapshot_preserves_append_order() {
        let log = TransactionLog::new();
        sample_append(&log, 1, 2);
        sample_append(&log, 3, 4);
        sample_append(&log, 5, 6);

        let snapshot = log.snapshot();
        let ids: Vec<u64> = snapshot.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let log = TransactionLog::new();
        sample_append(&log, 1, 2);

        let snapshot = log.snapshot();
        sample_append(&log, 3, 4);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_empty_log() {
        let log = TransactionLog::new();
        assert!(log.is_empty());
        assert_eq!(log.snapshot().len(), 0);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        use std::sync::Arc;
        use std::thread;

        let log = Arc::new(TransactionLog::new());
        let mut handles = vec![];

        for i in 0..8u64 {
            let log = Arc::clone(&log);
            handles.push(thread::spawn(move || {
                for _ in 0..25 {
                    sample_append(&log, i, i + 1);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 200);

        // Ids are unique even under contention
        let mut ids: Vec<u64> = log.snapshot().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }
}
