//! Transfer ledger
//!
//! This module provides the `Ledger`, the component that moves value
//! between wallets. It validates a transfer request, consults the wallet
//! store and the rate table, invokes the conversion engine, and then
//! performs the debit, the credit and the transaction append as one atomic
//! unit through the wallet store's pair primitive.
//!
//! Preconditions are checked in a fixed order and the first failure wins:
//! positive amount, sender wallet, receiver user + wallet, sufficient
//! balance, usable rates. The balance check is repeated inside the atomic
//! section, under the wallet locks, so concurrent transfers cannot both
//! pass against a stale read and jointly overdraw the sender.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use crate::core::convert::{convert, round_to_cents};
use crate::core::rates::RateTable;
use crate::core::traits::{Clock, UserDirectory};
use crate::core::transaction_log::TransactionLog;
use crate::core::wallet_store::WalletStore;
use crate::types::{
    normalize_code, LedgerError, Transaction, TransferReceipt, TransferRequest, UserId, Wallet,
};

/// The money-movement core
///
/// Owns no balances itself: wallets live in the [`WalletStore`], completed
/// transfers in the [`TransactionLog`], and user/time concerns come in
/// through collaborator traits. All four are shared handles, so the ledger
/// is cheap to clone across threads.
#[derive(Clone)]
pub struct Ledger {
    pub(crate) wallets: Arc<WalletStore>,
    pub(crate) rates: Arc<RateTable>,
    pub(crate) log: Arc<TransactionLog>,
    pub(crate) users: Arc<dyn UserDirectory>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Wire a ledger from its collaborators
    pub fn new(
        wallets: Arc<WalletStore>,
        rates: Arc<RateTable>,
        log: Arc<TransactionLog>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Ledger {
            wallets,
            rates,
            log,
            users,
            clock,
        }
    }

    /// Transfer money between two users with on-the-fly conversion
    ///
    /// On success exactly one [`Transaction`] has been appended and both
    /// balances reflect the transfer; on any error no state has changed.
    /// `TransferFailed` means the atomic commit itself hit a conflict (for
    /// example a wallet closed mid-flight) and the call is safe to retry
    /// with the same inputs.
    ///
    /// # Errors
    ///
    /// In precondition order: `Validation`, `InvalidAmount`,
    /// `SenderWalletNotFound`, `ReceiverWalletNotFound`,
    /// `InsufficientBalance`, `CurrencyNotFound`, `InvalidRate`; and from
    /// the commit itself `TransferFailed` or `ArithmeticOverflow`.
    pub fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt, LedgerError> {
        let request = request.validate()?;

        // 1. Positive amount
        if request.amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(request.amount, "transfer"));
        }

        // 2. Sender wallet exists
        let sender_wallet = match self.wallets.find(request.sender, &request.from_currency) {
            Ok(wallet) => wallet,
            Err(LedgerError::WalletNotFound { .. }) => {
                return Err(LedgerError::sender_wallet_not_found(&request.from_currency))
            }
            Err(other) => return Err(other),
        };

        // 3. Receiver user and wallet exist; the two cases are collapsed
        let receiver = match self.users.find_by_email(&request.receiver_email) {
            Ok(user) => user,
            Err(LedgerError::UserNotFound { .. }) => {
                return Err(LedgerError::receiver_wallet_not_found(
                    &request.receiver_email,
                    &request.to_currency,
                ))
            }
            Err(other) => return Err(other),
        };
        let receiver_wallet = match self.wallets.find(receiver.id, &request.to_currency) {
            Ok(wallet) => wallet,
            Err(LedgerError::WalletNotFound { .. }) => {
                return Err(LedgerError::receiver_wallet_not_found(
                    &receiver.email,
                    &request.to_currency,
                ))
            }
            Err(other) => return Err(other),
        };

        // 4. Sufficient balance (pre-check; re-validated under the lock)
        if sender_wallet.balance < request.amount {
            return Err(LedgerError::insufficient_balance(
                sender_wallet.balance,
                request.amount,
            ));
        }

        // 5. Usable rates; conversion rejects inactive and non-positive rates
        let from_rate = self.rates.get(&request.from_currency)?;
        let to_rate = self.rates.get(&request.to_currency)?;
        let converted = convert(request.amount, &from_rate, &to_rate)?;
        let received = round_to_cents(converted);

        let created_at = self.clock.now();

        // Atomic section: debit, credit and append commit together or not
        // at all. The append runs last inside the scope, after every
        // fallible step has passed.
        let transaction =
            self.wallets
                .atomic_pair(sender_wallet.id, receiver_wallet.id, |sender, other| {
                    if sender.balance < request.amount {
                        return Err(LedgerError::insufficient_balance(
                            sender.balance,
                            request.amount,
                        ));
                    }

                    sender.balance = sender
                        .balance
                        .checked_sub(request.amount)
                        .ok_or_else(|| LedgerError::arithmetic_overflow("transfer debit"))?;

                    // A transfer into the sender's own wallet applies both
                    // deltas to the single staged wallet.
                    let credited = match other {
                        Some(receiver) => receiver,
                        None => sender,
                    };
                    credited.balance = credited
                        .balance
                        .checked_add(received)
                        .ok_or_else(|| LedgerError::arithmetic_overflow("transfer credit"))?;

                    Ok(self.log.append(
                        sender_wallet.id,
                        receiver_wallet.id,
                        request.amount,
                        received,
                        &request.from_currency,
                        &request.to_currency,
                        created_at,
                    ))
                })?;

        info!(
            transaction = transaction.id,
            sender = request.sender,
            receiver = %receiver.email,
            "transfer committed: {} {} -> {} {}",
            request.amount,
            request.from_currency,
            received,
            request.to_currency,
        );

        Ok(TransferReceipt {
            sent: request.amount,
            received,
            counterparty_email: receiver.email,
        })
    }

    /// Top up a user's wallet, returning the new balance
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a malformed currency code or an
    ///   amount with more than 2 decimal places
    /// - `LedgerError::InvalidAmount` if `amount <= 0`
    /// - `LedgerError::WalletNotFound` if the user holds no such wallet
    pub fn top_up(
        &self,
        user: UserId,
        currency: &str,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let currency = normalize_code(currency)?;
        if amount.normalize().scale() > 2 {
            return Err(LedgerError::validation(format!(
                "amount {} has more than 2 decimal places",
                amount
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, "top-up"));
        }

        let wallet = self.wallets.find(user, &currency)?;
        let new_balance = self.wallets.top_up(wallet.id, amount)?;

        info!(
            user,
            wallet = wallet.id,
            "top-up committed: {} {} (new balance {})",
            amount,
            currency,
            new_balance,
        );

        Ok(new_balance)
    }

    /// Open a wallet for a user in the given currency
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a malformed currency code
    /// - `LedgerError::DuplicateWallet` if the pair already has a wallet
    pub fn open_wallet(&self, user: UserId, currency: &str) -> Result<Wallet, LedgerError> {
        self.wallets.create(user, currency, self.clock.now())
    }

    /// Close a user's wallet
    ///
    /// # Errors
    ///
    /// - `LedgerError::WalletNotFound` if the user holds no such wallet
    /// - `LedgerError::NonZeroBalance` if the balance is not zero
    pub fn close_wallet(&self, user: UserId, currency: &str) -> Result<(), LedgerError> {
        self.wallets.delete(user, currency)
    }

    /// All wallets a user currently holds, sorted by currency
    pub fn wallets_of(&self, user: UserId) -> Vec<Wallet> {
        self.wallets.list_by_owner(user)
    }

    /// Number of recorded transactions
    pub fn transaction_count(&self) -> usize {
        self.log.len()
    }

    /// Snapshot of every recorded transaction, in append order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.log.snapshot()
    }
}
