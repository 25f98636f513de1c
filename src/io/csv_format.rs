//! CSV format handling for operation input and result output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization of operation rows
//! - Conversion from CSV records to typed operations
//! - Wallet-state output serialization
//! - History export projection
//!
//! All functions are pure (no I/O) for easy testing.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

use crate::core::history::{Direction, HistoryEntry};

/// CSV record structure for deserialization
///
/// Matches the operation input format with columns:
/// `op,user,currency,counterparty,to_currency,amount`. All fields beyond
/// the op are optional because each operation uses a different subset.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub user: Option<String>,
    pub currency: Option<String>,
    pub counterparty: Option<String>,
    pub to_currency: Option<String>,
    pub amount: Option<String>,
}

/// A typed wallet operation parsed from one CSV row
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Register a user by email
    Register { email: String },

    /// Upsert a currency rate (the rate-ingestion interface)
    Rate { code: String, rate: Decimal },

    /// Mark a currency inactive
    Deactivate { code: String },

    /// Open a wallet
    OpenWallet { email: String, currency: String },

    /// Close a wallet
    CloseWallet { email: String, currency: String },

    /// Top up a wallet
    TopUp {
        email: String,
        currency: String,
        amount: Decimal,
    },

    /// Transfer between users with conversion
    Transfer {
        sender_email: String,
        from_currency: String,
        receiver_email: String,
        to_currency: String,
        amount: Decimal,
    },
}

/// One wallet state row for result output
#[derive(Debug, Clone, PartialEq)]
pub struct WalletRow {
    /// Owner email
    pub email: String,
    /// Currency code
    pub currency: String,
    /// Final balance
    pub balance: Decimal,
}

/// Convert a CsvRecord to a typed Operation
///
/// Validates that the fields each operation requires are present and that
/// amounts parse as decimals. Returns an error message describing the first
/// problem found; callers log it and skip the row.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, String> {
    let field = |value: &Option<String>, name: &str| -> Result<String, String> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(format!("{} op requires '{}'", csv_record.op, name)),
        }
    };
    let amount_field = |value: &Option<String>, name: &str| -> Result<Decimal, String> {
        let raw = field(value, name)?;
        Decimal::from_str(&raw).map_err(|_| format!("Invalid {} '{}'", name, raw))
    };

    match csv_record.op.trim().to_lowercase().as_str() {
        "register" => Ok(Operation::Register {
            email: field(&csv_record.user, "user")?,
        }),
        "rate" => Ok(Operation::Rate {
            code: field(&csv_record.currency, "currency")?,
            rate: amount_field(&csv_record.amount, "amount")?,
        }),
        "deactivate" => Ok(Operation::Deactivate {
            code: field(&csv_record.currency, "currency")?,
        }),
        "wallet" => Ok(Operation::OpenWallet {
            email: field(&csv_record.user, "user")?,
            currency: field(&csv_record.currency, "currency")?,
        }),
        "close" => Ok(Operation::CloseWallet {
            email: field(&csv_record.user, "user")?,
            currency: field(&csv_record.currency, "currency")?,
        }),
        "topup" => Ok(Operation::TopUp {
            email: field(&csv_record.user, "user")?,
            currency: field(&csv_record.currency, "currency")?,
            amount: amount_field(&csv_record.amount, "amount")?,
        }),
        "transfer" => Ok(Operation::Transfer {
            sender_email: field(&csv_record.user, "user")?,
            from_currency: field(&csv_record.currency, "currency")?,
            receiver_email: field(&csv_record.counterparty, "counterparty")?,
            to_currency: field(&csv_record.to_currency, "to_currency")?,
            amount: amount_field(&csv_record.amount, "amount")?,
        }),
        other => Err(format!("Invalid operation type: '{}'", other)),
    }
}

/// Write final wallet states to CSV format
///
/// Columns: `user,currency,balance`. Rows are sorted by email then currency
/// for deterministic output; balances are rendered with 2 decimal places.
pub fn write_wallets_csv(rows: &[WalletRow], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "currency", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_rows = rows.to_vec();
    sorted_rows.sort_by(|a, b| a.email.cmp(&b.email).then(a.currency.cmp(&b.currency)));

    for row in sorted_rows {
        writer
            .write_record(&[
                row.email,
                row.currency,
                format!("{:.2}", row.balance),
            ])
            .map_err(|e| format!("Failed to write wallet record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write a user's transaction history to CSV format
///
/// Projects each history entry onto the export layout of the original
/// service: sent rows carry the sent amount/currency, received rows the
/// received amount/currency, and the counterparty column holds the other
/// party's email (blank when unresolvable).
pub fn write_history_csv(entries: &[HistoryEntry], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "Date",
            "Type",
            "Amount Sent",
            "Currency Sent",
            "Amount Received",
            "Currency Received",
            "Counterparty",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for entry in entries {
        let tx = &entry.transaction;
        let (amount_sent, currency_sent, amount_received, currency_received) =
            match entry.direction {
                Direction::Sent => (
                    format!("{:.2}", tx.amount_sent),
                    tx.from_currency.clone(),
                    String::new(),
                    String::new(),
                ),
                Direction::Received => (
                    String::new(),
                    String::new(),
                    format!("{:.2}", tx.amount_received),
                    tx.to_currency.clone(),
                ),
            };

        writer
            .write_record(&[
                tx.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                entry.direction.to_string(),
                amount_sent,
                currency_sent,
                amount_received,
                currency_received,
                entry.counterparty_email.clone().unwrap_or_default(),
            ])
            .map_err(|e| format!("Failed to write history record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
