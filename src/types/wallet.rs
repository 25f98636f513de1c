//! Wallet types for the wallet ledger
//!
//! A wallet is a per-user, per-currency balance account. The pair
//! `(owner, currency)` is unique across the store; the numeric wallet id is
//! the handle the ledger and the transaction log work with.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// User identifier
pub type UserId = u64;

/// Wallet identifier
///
/// Assigned in creation order by the wallet store. The atomic transfer
/// primitive canonicalizes its lock order by ascending wallet id.
pub type WalletId = u64;

/// A per-user, per-currency balance account
///
/// Balances never go negative: every mutation runs through the wallet
/// store's atomic primitives, which re-validate before committing. Displayed
/// with 2 fractional digits; intermediate conversion math carries full
/// decimal precision.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    /// Unique wallet id
    pub id: WalletId,

    /// Owning user
    pub owner: UserId,

    /// Uppercase currency code this wallet holds
    pub currency: String,

    /// Current balance, always >= 0
    pub balance: Decimal,

    /// When the wallet was opened
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new empty wallet
    pub fn new(id: WalletId, owner: UserId, currency: String, created_at: DateTime<Utc>) -> Self {
        Wallet {
            id,
            owner,
            currency,
            balance: Decimal::ZERO,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wallet_starts_empty() {
        let opened = Utc::now();
        let wallet = Wallet::new(7, 3, "USD".to_string(), opened);

        assert_eq!(wallet.id, 7);
        assert_eq!(wallet.owner, 3);
        assert_eq!(wallet.currency, "USD");
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.created_at, opened);
    }
}
