//! Wallet store with atomic mutation primitives
//!
//! This module provides the `WalletStore`, the arena of wallet records and
//! the only place balances are ever mutated. All mutation flows through two
//! scoped primitives, [`WalletStore::atomic_update`] (one wallet) and
//! [`WalletStore::atomic_pair`] (two wallets): each acquires the wallet
//! locks, runs the caller's closure against staged copies, and writes the
//! copies back only when the closure succeeds. Any error leaves every
//! balance exactly as it was.
//!
//! # Concurrency
//!
//! Wallets live in a `DashMap` arena keyed by id, each behind its own
//! `Mutex`, with a unique `(owner, currency)` index alongside. The pair
//! primitive acquires locks in ascending wallet id order, so two transfers
//! touching the same wallet pair in opposite directions cannot deadlock.
//! Balance checks performed by the closure run under the lock, which is
//! what prevents two racing transfers from both passing a stale balance
//! check and jointly overdrawing a wallet.
//!
//! A wallet closed while another operation holds a reference to it is
//! detected inside the locked scope and reported as a retriable conflict.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::types::{normalize_code, LedgerError, UserId, Wallet, WalletId};

/// Arena of wallet records, keyed by wallet id
///
/// Enforces `(owner, currency)` uniqueness and routes every balance
/// mutation through its atomic primitives. Reads return snapshots; holding
/// a snapshot never blocks other operations.
#[derive(Debug)]
pub struct WalletStore {
    /// Wallet records, each behind its own lock
    wallets: DashMap<WalletId, Arc<Mutex<Wallet>>>,

    /// Unique (owner, currency) -> wallet id index
    by_owner: DashMap<(UserId, String), WalletId>,

    /// Next wallet id to assign
    next_id: AtomicU64,
}

impl WalletStore {
    /// Create a new empty store
    pub fn new() -> Self {
        WalletStore {
            wallets: DashMap::new(),
            by_owner: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Open a wallet for an (owner, currency) pair
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a malformed currency code
    /// - `LedgerError::DuplicateWallet` if the pair already has a wallet
    pub fn create(
        &self,
        owner: UserId,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Wallet, LedgerError> {
        let currency = normalize_code(currency)?;

        match self.by_owner.entry((owner, currency.clone())) {
            Entry::Occupied(_) => Err(LedgerError::duplicate_wallet(&currency)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let wallet = Wallet::new(id, owner, currency, created_at);
                self.wallets
                    .insert(id, Arc::new(Mutex::new(wallet.clone())));
                slot.insert(id);
                Ok(wallet)
            }
        }
    }

    /// Find a wallet by owner and currency
    ///
    /// Returns a snapshot of the wallet at the time of the call.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a malformed currency code
    /// - `LedgerError::WalletNotFound` if the pair has no wallet
    pub fn find(&self, owner: UserId, currency: &str) -> Result<Wallet, LedgerError> {
        let currency = normalize_code(currency)?;

        let id = self
            .by_owner
            .get(&(owner, currency.clone()))
            .map(|entry| *entry)
            .ok_or_else(|| LedgerError::wallet_not_found(&currency))?;

        self.get(id)
            .ok_or_else(|| LedgerError::wallet_not_found(&currency))
    }

    /// Get a wallet snapshot by id
    ///
    /// Returns `None` for ids that were never assigned or whose wallet has
    /// been closed.
    pub fn get(&self, id: WalletId) -> Option<Wallet> {
        let arc = self.wallets.get(&id).map(|entry| Arc::clone(entry.value()))?;
        let guard = arc.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(guard.clone())
    }

    /// List all wallets of an owner, sorted by currency code
    pub fn list_by_owner(&self, owner: UserId) -> Vec<Wallet> {
        let mut wallets: Vec<Wallet> = self
            .by_owner
            .iter()
            .filter(|entry| entry.key().0 == owner)
            .filter_map(|entry| self.get(*entry.value()))
            .collect();
        wallets.sort_by(|a, b| a.currency.cmp(&b.currency));
        wallets
    }

    /// Ids of every wallet an owner currently holds
    pub fn owned_ids(&self, owner: UserId) -> HashSet<WalletId> {
        self.by_owner
            .iter()
            .filter(|entry| entry.key().0 == owner)
            .map(|entry| *entry.value())
            .collect()
    }

    /// Snapshot every wallet in the store
    pub fn all_wallets(&self) -> Vec<Wallet> {
        self.wallets
            .iter()
            .map(|entry| {
                entry
                    .value()
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone()
            })
            .collect()
    }

    /// Atomically increment a wallet balance
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` if `amount <= 0`
    /// - `LedgerError::TransferFailed` if the wallet was closed concurrently
    /// - `LedgerError::ArithmeticOverflow` on checked-add failure
    pub fn top_up(&self, id: WalletId, amount: Decimal) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, "top-up"));
        }

        self.atomic_update(id, |wallet| {
            wallet.balance = wallet
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("top-up"))?;
            Ok(wallet.balance)
        })
    }

    /// Close a wallet
    ///
    /// The removal runs while the wallet lock is held, so an in-flight
    /// transfer either commits before the close or observes the close as a
    /// conflict inside its own atomic section.
    ///
    /// # Errors
    ///
    /// - `LedgerError::WalletNotFound` if the pair has no wallet
    /// - `LedgerError::NonZeroBalance` if the balance is not zero
    pub fn delete(&self, owner: UserId, currency: &str) -> Result<(), LedgerError> {
        let currency = normalize_code(currency)?;
        let key = (owner, currency.clone());

        let id = self
            .by_owner
            .get(&key)
            .map(|entry| *entry)
            .ok_or_else(|| LedgerError::wallet_not_found(&currency))?;

        let arc = self
            .wallets
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::wallet_not_found(&currency))?;

        let guard = arc
            .lock()
            .map_err(|_| LedgerError::transfer_failed("wallet lock poisoned"))?;

        // Re-check under the lock: a racing close may have won already
        if !self.wallets.contains_key(&id) {
            return Err(LedgerError::wallet_not_found(&currency));
        }
        if guard.balance > Decimal::ZERO {
            return Err(LedgerError::non_zero_balance(guard.balance));
        }

        self.by_owner.remove(&key);
        self.wallets.remove(&id);
        Ok(())
    }

    /// Run a closure atomically against a single wallet
    ///
    /// The closure receives a staged copy of the wallet; the copy is written
    /// back only if the closure returns `Ok`, so an error leaves the wallet
    /// untouched.
    ///
    /// # Errors
    ///
    /// - `LedgerError::TransferFailed` if the wallet was closed concurrently
    ///   or its lock is poisoned
    /// - Whatever error the closure returns
    pub fn atomic_update<T, F>(&self, id: WalletId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Wallet) -> Result<T, LedgerError>,
    {
        let arc = self
            .wallets
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::transfer_failed("wallet no longer exists"))?;

        let mut guard = arc
            .lock()
            .map_err(|_| LedgerError::transfer_failed("wallet lock poisoned"))?;

        // Re-check under the lock: the wallet may have been closed between
        // the arena lookup and the lock acquisition.
        if !self.wallets.contains_key(&id) {
            return Err(LedgerError::transfer_failed("wallet no longer exists"));
        }

        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        *guard = staged;
        Ok(out)
    }

    /// Run a closure atomically against a pair of wallets
    ///
    /// This is the scoped-transaction primitive behind every transfer. Locks
    /// are acquired in ascending wallet id order; when both sides are the
    /// same wallet the closure receives it once and `None` for the second
    /// argument. The closure works on staged copies and both copies commit
    /// together on `Ok` - on any error neither wallet changes and nothing
    /// is observable to concurrent readers.
    ///
    /// # Errors
    ///
    /// - `LedgerError::TransferFailed` if either wallet was closed
    ///   concurrently or a lock is poisoned
    /// - Whatever error the closure returns
    pub fn atomic_pair<T, F>(&self, a: WalletId, b: WalletId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Wallet, Option<&mut Wallet>) -> Result<T, LedgerError>,
    {
        let poisoned = || LedgerError::transfer_failed("wallet lock poisoned");
        let closed = || LedgerError::transfer_failed("wallet no longer exists");

        if a == b {
            return self.atomic_update(a, |wallet| f(wallet, None));
        }

        let arc_a = self
            .wallets
            .get(&a)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(closed)?;
        let arc_b = self
            .wallets
            .get(&b)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(closed)?;

        // Canonical lock order: ascending wallet id
        let (mut guard_a, mut guard_b) = if a < b {
            let guard_a = arc_a.lock().map_err(|_| poisoned())?;
            let guard_b = arc_b.lock().map_err(|_| poisoned())?;
            (guard_a, guard_b)
        } else {
            let guard_b = arc_b.lock().map_err(|_| poisoned())?;
            let guard_a = arc_a.lock().map_err(|_| poisoned())?;
            (guard_a, guard_b)
        };

        if !self.wallets.contains_key(&a) || !self.wallets.contains_key(&b) {
            return Err(closed());
        }

        let mut staged_a = guard_a.clone();
        let mut staged_b = guard_b.clone();
        let out = f(&mut staged_a, Some(&mut staged_b))?;

        // Commit both sides together
        *guard_a = staged_a;
        *guard_b = staged_b;
        Ok(out)
    }
}

impl Default for WalletStore {
    fn default() -> Self {
        Self::new()
    }
}
