//! Account-related types for the ledger engine
//!
//! This module defines the Account structure along with the closed
//! enumerations for account kind and lifecycle status. Status and kind are
//! tagged variants rather than free strings so that invalid states are
//! unrepresentable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier, assigned by the store and immutable afterwards
pub type AccountId = u32;

/// Owner identifier
///
/// A foreign reference to a user. The ledger engine treats it as opaque;
/// user management lives outside this crate.
pub type OwnerId = u32;

/// The product kind of an account
///
/// Opaque to the engine beyond display; no business rule in this crate
/// branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Day-to-day transactional account
    Chequing,
    /// Interest-bearing savings account (interest accrual is out of scope)
    Savings,
}

impl AccountKind {
    /// Display label used in the account summary output
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Chequing => "chequing",
            AccountKind::Savings => "savings",
        }
    }
}

/// Lifecycle status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Normal state: all operations permitted
    Active,
    /// Terminal state: balance was zero at closure, all operations rejected
    Closed,
    /// Debits rejected; whether credits are accepted is an engine policy
    /// decision (see [`FrozenPolicy`](crate::core::FrozenPolicy))
    Frozen,
}

impl AccountStatus {
    /// Display label used in the account summary output
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Closed => "closed",
            AccountStatus::Frozen => "frozen",
        }
    }
}

/// A user-owned account row
///
/// Accounts are created once by the account-opening flow (via
/// [`AccountStore::open`](crate::core::AccountStore::open)) and from then on
/// mutated only through balance updates driven by ledger entries. They are
/// never deleted, only transitioned to [`AccountStatus::Closed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// Store-assigned identifier
    pub id: AccountId,

    /// Owning user (opaque foreign reference)
    pub owner: OwnerId,

    /// Externally generated account number, e.g. "AC-1731881234567"
    ///
    /// The engine never validates the format; it only carries the number so
    /// that transfer descriptions can reference the counterpart account.
    pub number: String,

    /// Product kind
    pub kind: AccountKind,

    /// Current balance, exact decimal
    ///
    /// Invariant: equals the sum of all applied ledger entries for this
    /// account on top of the opening balance. Never negative as the result
    /// of a withdrawal or transfer-out.
    pub balance: Decimal,

    /// Lifecycle status
    pub status: AccountStatus,

    /// Store-assigned creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccountStatus::Active, "active")]
    #[case(AccountStatus::Closed, "closed")]
    #[case(AccountStatus::Frozen, "frozen")]
    fn status_labels(#[case] status: AccountStatus, #[case] expected: &str) {
        assert_eq!(status.as_str(), expected);
    }

    #[rstest]
    #[case(AccountKind::Chequing, "chequing")]
    #[case(AccountKind::Savings, "savings")]
    fn kind_labels(#[case] kind: AccountKind, #[case] expected: &str) {
        assert_eq!(kind.as_str(), expected);
    }
}
