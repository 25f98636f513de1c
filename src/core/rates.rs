//! Currency rate table
//!
//! This module provides the `RateTable`, the concurrent map of currency
//! codes to conversion rates. The transfer core only ever reads from the
//! table; writes come from an external rate-ingestion job through
//! [`RateTable::update_rate`] and [`RateTable::set_active`].
//!
//! # Thread Safety
//!
//! The table uses `DashMap` for fine-grained locking, so rate reads during
//! transfers never contend with ingestion updates on other currencies. A
//! rate is immutable during a single conversion because the ledger reads it
//! once and passes the snapshot into the conversion engine.

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::types::{normalize_code, CurrencyRate, LedgerError, RATE_SCALE};

/// Concurrent table of currency conversion rates
///
/// Holds `code -> CurrencyRate` mappings. Inactive currencies stay in the
/// table (so their codes keep resolving for display) but are rejected at
/// conversion time.
#[derive(Debug, Default)]
pub struct RateTable {
    /// Map of uppercase currency codes to rate entries
    rates: DashMap<String, CurrencyRate>,
}

impl RateTable {
    /// Create a new empty rate table
    pub fn new() -> Self {
        RateTable {
            rates: DashMap::new(),
        }
    }

    /// Insert or update a currency rate
    ///
    /// This is the ingestion interface: an upsert re-activates the currency
    /// and quantizes the rate to [`RATE_SCALE`] fractional digits, the
    /// precision the table persists. An existing entry keeps its name; a
    /// new entry falls back to the code as its name.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a malformed currency code
    /// - `LedgerError::InvalidRate` if the rate is zero or negative
    pub fn update_rate(&self, code: &str, rate: Decimal) -> Result<(), LedgerError> {
        let code = normalize_code(code)?;

        if rate <= Decimal::ZERO {
            return Err(LedgerError::invalid_rate(
                &code,
                &format!("rate {} is not positive", rate),
            ));
        }
        let rate = rate.round_dp(RATE_SCALE);

        self.rates
            .entry(code.clone())
            .and_modify(|entry| {
                entry.rate_to_base = rate;
                entry.is_active = true;
            })
            .or_insert_with(|| CurrencyRate {
                name: code.clone(),
                code,
                rate_to_base: rate,
                is_active: true,
            });

        Ok(())
    }

    /// Activate or deactivate a currency
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CurrencyNotFound` if the code is unknown.
    pub fn set_active(&self, code: &str, active: bool) -> Result<(), LedgerError> {
        let code = normalize_code(code)?;

        match self.rates.get_mut(&code) {
            Some(mut entry) => {
                entry.is_active = active;
                Ok(())
            }
            None => Err(LedgerError::currency_not_found(&code)),
        }
    }

    /// Get a snapshot of a currency entry, active or not
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CurrencyNotFound` if the code is unknown.
    pub fn get(&self, code: &str) -> Result<CurrencyRate, LedgerError> {
        let code = normalize_code(code)?;

        self.rates
            .get(&code)
            .map(|entry| entry.clone())
            .ok_or_else(|| LedgerError::currency_not_found(&code))
    }

    /// Get the conversion rate of an active currency
    ///
    /// # Errors
    ///
    /// - `LedgerError::CurrencyNotFound` if the code is unknown
    /// - `LedgerError::InvalidRate` if the currency is inactive or its rate
    ///   is not positive
    pub fn get_active_rate(&self, code: &str) -> Result<Decimal, LedgerError> {
        let entry = self.get(code)?;

        if !entry.is_active {
            return Err(LedgerError::invalid_rate(&entry.code, "currency is inactive"));
        }
        if entry.rate_to_base <= Decimal::ZERO {
            return Err(LedgerError::invalid_rate(
                &entry.code,
                &format!("rate {} is not positive", entry.rate_to_base),
            ));
        }

        Ok(entry.rate_to_base)
    }

    /// List all active currencies sorted by code
    pub fn list_active(&self) -> Vec<CurrencyRate> {
        let mut active: Vec<CurrencyRate> = self
            .rates
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.clone())
            .collect();
        active.sort_by(|a, b| a.code.cmp(&b.code));
        active
    }
}
