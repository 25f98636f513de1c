//! Transaction and transfer types for the wallet ledger
//!
//! This module defines the immutable ledger entry recorded for every
//! completed transfer, the typed transfer request validated up front, and
//! the receipt returned to the caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{normalize_code, LedgerError, UserId, WalletId};

/// Transaction identifier
///
/// Assigned in append order by the transaction log.
pub type TransactionId = u64;

/// An immutable ledger entry documenting a completed transfer
///
/// Created exactly once, atomically with the wallet balance mutations it
/// records, and never updated or deleted afterwards. Currency codes are
/// captured at transfer time rather than referenced live, so the record
/// stays historically accurate when rates change later.
///
/// The field set is the durable contract that history, analytics and export
/// consumers rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction id
    pub id: TransactionId,

    /// Wallet that was debited
    pub sender_wallet_id: WalletId,

    /// Wallet that was credited
    pub receiver_wallet_id: WalletId,

    /// Amount debited, in the source currency, as requested
    pub amount_sent: Decimal,

    /// Amount credited, in the target currency, rounded to 2 decimals
    pub amount_received: Decimal,

    /// Source currency code at transfer time
    pub from_currency: String,

    /// Target currency code at transfer time
    pub to_currency: String,

    /// When the transfer committed
    pub created_at: DateTime<Utc>,
}

/// A money-transfer request, validated before the core runs
///
/// Carries the raw caller input. [`TransferRequest::validate`] either
/// produces a normalized request (trimmed email, uppercase currency codes)
/// or a structured error, so the ledger core only ever sees well-formed
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// Sending user
    pub sender: UserId,

    /// Receiver, addressed by email
    pub receiver_email: String,

    /// Currency to debit from the sender
    pub from_currency: String,

    /// Currency to credit to the receiver
    pub to_currency: String,

    /// Amount to debit, in the source currency
    pub amount: Decimal,
}

impl TransferRequest {
    /// Validate the request shape and normalize its fields
    ///
    /// Checks run in field order: receiver email, source currency, target
    /// currency, amount precision. Amount positivity is a ledger
    /// precondition, not a shape concern, and is checked by the transfer
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for an empty or malformed email,
    /// an invalid currency code, or an amount carrying more than 2
    /// fractional digits.
    pub fn validate(self) -> Result<TransferRequest, LedgerError> {
        let receiver_email = self.receiver_email.trim().to_string();
        if receiver_email.is_empty() {
            return Err(LedgerError::validation("receiver email is required"));
        }
        if !receiver_email.contains('@') {
            return Err(LedgerError::validation(format!(
                "'{}' is not a valid email address",
                receiver_email
            )));
        }

        let from_currency = normalize_code(&self.from_currency)?;
        let to_currency = normalize_code(&self.to_currency)?;

        if self.amount.normalize().scale() > 2 {
            return Err(LedgerError::validation(format!(
                "amount {} has more than 2 decimal places",
                self.amount
            )));
        }

        Ok(TransferRequest {
            sender: self.sender,
            receiver_email,
            from_currency,
            to_currency,
            amount: self.amount,
        })
    }
}

/// Outcome of a successful transfer, returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReceipt {
    /// Amount debited from the sender, in the source currency
    pub sent: Decimal,

    /// Amount credited to the receiver, in the target currency
    pub received: Decimal,

    /// Email of the receiving user
    pub counterparty_email: String,
}
