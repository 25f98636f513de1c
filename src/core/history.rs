//! History and analytics over the transaction log
//!
//! Read-only aggregation: these queries resolve the user's current wallets,
//! filter the append-only transaction log to entries touching them, and
//! never interact with the mutation path. Filtering mirrors the query
//! surface of the original service: free-text search across counterparty
//! emails and currency codes, a currency filter matching either side, a
//! direction filter, and recency-descending ordering.

use rust_decimal::Decimal;
use std::fmt;

use crate::core::ledger::Ledger;
use crate::types::{Transaction, UserId, WalletId};

/// Which side of a transfer the querying user was on
///
/// A self-transfer (both wallets owned by the user) is labelled `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The user owned the debited wallet
    Sent,
    /// The user owned the credited wallet
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => f.write_str("Sent"),
            Direction::Received => f.write_str("Received"),
        }
    }
}

/// Filters applied to a history query
///
/// Empty strings behave like absent filters, matching the lenient query
/// parameters of the original service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    /// Case-insensitive substring match over both party emails and both
    /// currency codes
    pub search: Option<String>,

    /// Keep transactions where either side is this currency
    pub currency: Option<String>,

    /// Keep transactions where the user is on this side
    ///
    /// A self-transfer is on both sides and passes either filter.
    pub direction: Option<Direction>,
}

/// One transaction as seen from a user's perspective
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The underlying ledger record
    pub transaction: Transaction,

    /// Which side the user was on
    pub direction: Direction,

    /// Email of the other party; `None` when the counterparty wallet has
    /// since been closed
    pub counterparty_email: Option<String>,
}

/// Aggregated transfer totals for one user
///
/// Sums are taken over raw recorded amounts, so `total_sent` mixes source
/// currencies and `total_received` mixes target currencies, exactly as the
/// original analytics endpoint did.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    /// Sum of `amount_sent` over transactions the user sent
    pub total_sent: Decimal,

    /// Sum of `amount_received` over transactions the user received
    pub total_received: Decimal,

    /// Number of distinct transactions touching the user's wallets
    ///
    /// A self-transfer appears on both sides but is counted once.
    pub count: usize,

    /// `total_received - total_sent`
    pub net_change: Decimal,
}

impl Ledger {
    /// Query a user's transaction history
    ///
    /// Returns only transactions where the user owns the sender or the
    /// receiver wallet, newest first (ties broken by descending id, i.e.
    /// reverse append order). The result is a finite, re-queryable
    /// snapshot, not a live view.
    pub fn history(&self, user: UserId, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        let owned = self.wallets.owned_ids(user);
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let currency = filter
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let mut entries: Vec<HistoryEntry> = Vec::new();
        for transaction in self.log.snapshot() {
            let sent = owned.contains(&transaction.sender_wallet_id);
            let received = owned.contains(&transaction.receiver_wallet_id);
            if !sent && !received {
                continue;
            }

            if let Some(code) = currency {
                if !transaction.from_currency.eq_ignore_ascii_case(code)
                    && !transaction.to_currency.eq_ignore_ascii_case(code)
                {
                    continue;
                }
            }

            match filter.direction {
                Some(Direction::Sent) if !sent => continue,
                Some(Direction::Received) if !received => continue,
                _ => {}
            }

            let sender_email = self.wallet_owner_email(transaction.sender_wallet_id);
            let receiver_email = self.wallet_owner_email(transaction.receiver_wallet_id);

            if let Some(needle) = &search {
                let mut haystacks = vec![
                    transaction.from_currency.to_lowercase(),
                    transaction.to_currency.to_lowercase(),
                ];
                haystacks.extend(sender_email.iter().map(|e| e.to_lowercase()));
                haystacks.extend(receiver_email.iter().map(|e| e.to_lowercase()));
                if !haystacks.iter().any(|h| h.contains(needle)) {
                    continue;
                }
            }

            let direction = if sent {
                Direction::Sent
            } else {
                Direction::Received
            };
            let counterparty_email = match direction {
                Direction::Sent => receiver_email,
                Direction::Received => sender_email,
            };

            entries.push(HistoryEntry {
                transaction,
                direction,
                counterparty_email,
            });
        }

        entries.sort_by(|a, b| {
            b.transaction
                .created_at
                .cmp(&a.transaction.created_at)
                .then(b.transaction.id.cmp(&a.transaction.id))
        });
        entries
    }

    /// Aggregate transfer totals for a user
    pub fn analytics(&self, user: UserId) -> AnalyticsSummary {
        let owned = self.wallets.owned_ids(user);

        let mut total_sent = Decimal::ZERO;
        let mut total_received = Decimal::ZERO;
        let mut count = 0usize;

        for transaction in self.log.snapshot() {
            let sent = owned.contains(&transaction.sender_wallet_id);
            let received = owned.contains(&transaction.receiver_wallet_id);

            if sent {
                total_sent += transaction.amount_sent;
            }
            if received {
                total_received += transaction.amount_received;
            }
            // Union count: a self-transfer hits both branches above but is
            // still a single transaction.
            if sent || received {
                count += 1;
            }
        }

        AnalyticsSummary {
            total_sent,
            total_received,
            count,
            net_change: total_received - total_sent,
        }
    }

    fn wallet_owner_email(&self, id: WalletId) -> Option<String> {
        let wallet = self.wallets.get(id)?;
        self.users.find_by_id(wallet.owner).ok().map(|u| u.email)
    }
}
