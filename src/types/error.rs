//! Error types for the wallet ledger
//!
//! This module defines all error kinds that can occur while validating and
//! executing wallet operations. Every failure is detected locally and
//! returned to the caller as a typed result; nothing is silently swallowed
//! and no failure path leaves partially-applied state behind.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: file not found, permission denied, etc.
//! - **CSV Parsing Errors**: malformed rows in the operation input
//! - **Validation Errors**: bad or missing input shape
//! - **Lookup Errors**: user/wallet/currency absent
//! - **Domain Errors**: insufficient balance, inactive rate, duplicate
//!   wallet, non-zero balance on close
//! - **Commit Errors**: conflicts inside the atomic section (retriable)

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the wallet ledger
///
/// Each variant carries enough context to produce a useful human-readable
/// message for CLI output and log lines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    ///
    /// Fatal for the replay pipeline; processing cannot start.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Recoverable - the malformed row is skipped and processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Request failed structural validation before reaching the core
    ///
    /// Covers empty emails, malformed currency codes and amounts carrying
    /// more fractional digits than the ledger persists.
    #[error("Validation failed: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// No user is registered under the given email
    #[error("User not found: {email}")]
    UserNotFound {
        /// The email that failed to resolve
        email: String,
    },

    /// The acting user holds no wallet for the given currency
    #[error("Wallet not found for currency {currency}")]
    WalletNotFound {
        /// Currency code of the missing wallet
        currency: String,
    },

    /// The sender holds no wallet in the source currency
    #[error("Sender wallet not found for currency {currency}")]
    SenderWalletNotFound {
        /// Source currency code
        currency: String,
    },

    /// The receiver does not exist or holds no wallet in the target currency
    ///
    /// The two cases are deliberately collapsed: callers learn only that the
    /// destination could not be resolved.
    #[error("Receiver wallet not found for {email} in currency {currency}")]
    ReceiverWalletNotFound {
        /// Receiver email from the request
        email: String,
        /// Target currency code
        currency: String,
    },

    /// No currency is registered under the given code
    #[error("Currency not found: {code}")]
    CurrencyNotFound {
        /// The unknown currency code
        code: String,
    },

    /// Amount is zero or negative where a positive amount is required
    #[error("Invalid amount {amount} for {operation}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Operation that rejected it
        operation: String,
    },

    /// Sender balance cannot cover the requested amount
    ///
    /// Recoverable - the transfer is rejected and no state changes.
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Balance at the time of the check
        available: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Currency rate is unusable for conversion
    ///
    /// Raised for inactive currencies and for zero or negative rates.
    #[error("Invalid rate for {code}: {reason}")]
    InvalidRate {
        /// Currency code whose rate is unusable
        code: String,
        /// Why the rate was rejected
        reason: String,
    },

    /// A wallet already exists for this (owner, currency) pair
    #[error("Wallet already exists for currency {currency}")]
    DuplicateWallet {
        /// Currency code of the existing wallet
        currency: String,
    },

    /// Wallet still carries a balance and cannot be closed
    #[error("Cannot close wallet with balance {balance}")]
    NonZeroBalance {
        /// Remaining balance
        balance: Decimal,
    },

    /// The atomic commit hit a conflict (e.g. a wallet closed mid-flight)
    ///
    /// No partial state persists; the caller may safely retry with the same
    /// inputs.
    #[error("Transfer failed: {reason}")]
    TransferFailed {
        /// Description of the conflict
        reason: String,
    },

    /// Checked decimal arithmetic would overflow
    ///
    /// Recoverable - the operation is rejected to keep balances intact.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation {
            message: message.into(),
        }
    }

    /// Create a UserNotFound error
    pub fn user_not_found(email: &str) -> Self {
        LedgerError::UserNotFound {
            email: email.to_string(),
        }
    }

    /// Create a WalletNotFound error
    pub fn wallet_not_found(currency: &str) -> Self {
        LedgerError::WalletNotFound {
            currency: currency.to_string(),
        }
    }

    /// Create a SenderWalletNotFound error
    pub fn sender_wallet_not_found(currency: &str) -> Self {
        LedgerError::SenderWalletNotFound {
            currency: currency.to_string(),
        }
    }

    /// Create a ReceiverWalletNotFound error
    pub fn receiver_wallet_not_found(email: &str, currency: &str) -> Self {
        LedgerError::ReceiverWalletNotFound {
            email: email.to_string(),
            currency: currency.to_string(),
        }
    }

    /// Create a CurrencyNotFound error
    pub fn currency_not_found(code: &str) -> Self {
        LedgerError::CurrencyNotFound {
            code: code.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, operation: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            available,
            requested,
        }
    }

    /// Create an InvalidRate error
    pub fn invalid_rate(code: &str, reason: &str) -> Self {
        LedgerError::InvalidRate {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a DuplicateWallet error
    pub fn duplicate_wallet(currency: &str) -> Self {
        LedgerError::DuplicateWallet {
            currency: currency.to_string(),
        }
    }

    /// Create a NonZeroBalance error
    pub fn non_zero_balance(balance: Decimal) -> Self {
        LedgerError::NonZeroBalance { balance }
    }

    /// Create a TransferFailed error
    pub fn transfer_failed(reason: &str) -> Self {
        LedgerError::TransferFailed {
            reason: reason.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }
}
