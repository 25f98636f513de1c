//! In-memory user directory
//!
//! User accounts proper (passwords, profiles, favourites) are an external
//! concern; the ledger only needs email and id resolution. This module
//! provides the `InMemoryUserDirectory` used by the replay harness and the
//! test suite.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::traits::UserDirectory;
use crate::types::{LedgerError, UserId};

/// A registered user, as the ledger sees one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user id
    pub id: UserId,

    /// Normalized (lowercase) email address, unique across the directory
    pub email: String,
}

/// Thread-safe in-memory user directory
///
/// Emails are normalized to lowercase and unique. Ids are assigned in
/// registration order starting at 1.
#[derive(Debug)]
pub struct InMemoryUserDirectory {
    /// Email -> id index enforcing email uniqueness
    by_email: DashMap<String, UserId>,

    /// Id -> user records
    by_id: DashMap<UserId, User>,

    /// Next id to assign
    next_id: AtomicU64,
}

impl InMemoryUserDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        InMemoryUserDirectory {
            by_email: DashMap::new(),
            by_id: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new user by email
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for an empty or malformed email, or when
    ///   the email is already registered
    pub fn register(&self, email: &str) -> Result<User, LedgerError> {
        let email = normalize_email(email)?;

        match self.by_email.entry(email.clone()) {
            Entry::Occupied(_) => Err(LedgerError::validation(format!(
                "user {} already exists",
                email
            ))),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let user = User { id, email };
                self.by_id.insert(id, user.clone());
                slot.insert(id);
                Ok(user)
            }
        }
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str) -> Result<User, LedgerError> {
        let normalized = normalize_email(email)?;

        let id = self
            .by_email
            .get(&normalized)
            .map(|entry| *entry)
            .ok_or_else(|| LedgerError::user_not_found(&normalized))?;

        self.by_id
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| LedgerError::user_not_found(&normalized))
    }

    fn find_by_id(&self, id: UserId) -> Result<User, LedgerError> {
        self.by_id
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| LedgerError::user_not_found(&format!("id {}", id)))
    }
}

fn normalize_email(email: &str) -> Result<String, LedgerError> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(LedgerError::validation("email is required"));
    }
    if !normalized.contains('@') {
        return Err(LedgerError::validation(format!(
            "'{}' is not a valid email address",
            normalized
        )));
    }
    Ok(normalized)
}
