//! Collaborator traits for the ledger core
//!
//! The transfer core does not own user management or wall-clock time; it
//! consumes them through these traits. Production wiring uses the in-memory
//! directory and [`SystemClock`]; tests substitute fixed implementations.

use chrono::{DateTime, Utc};

use crate::core::users::User;
use crate::types::{LedgerError, UserId};

/// Lookup interface for registered users
///
/// Backed by an external account system in a full deployment; the crate
/// ships [`crate::core::users::InMemoryUserDirectory`] for the replay
/// harness and tests.
pub trait UserDirectory: Send + Sync {
    /// Resolve a user by email address
    fn find_by_email(&self, email: &str) -> Result<User, LedgerError>;

    /// Resolve a user by id
    fn find_by_id(&self, id: UserId) -> Result<User, LedgerError>;
}

/// Time source for `created_at` stamping
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant
///
/// Used by tests and fixture replays that need deterministic timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_returns_pinned_instant() {
        let instant = Utc::now();
        let clock = FixedClock(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
