//! Ledger entry types
//!
//! A ledger entry is an immutable record of one directional movement of
//! money into or out of one account. Entries are created once and never
//! mutated or deleted; together they form the append-only audit trail that
//! every balance must reconcile against.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::AccountId;

/// Ledger entry identifier, assigned by the store
pub type EntryId = u64;

/// Direction and nature of a ledger entry
///
/// The amount on an entry is always strictly positive; direction is carried
/// here, not by the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Money entered the account from outside the ledger
    Deposit,
    /// Money left the account to outside the ledger
    Withdrawal,
    /// Money left the account towards another account
    TransferOut,
    /// Money entered the account from another account
    TransferIn,
}

impl EntryKind {
    /// Default description substituted when the caller supplies blank text
    pub fn default_description(&self) -> &'static str {
        match self {
            EntryKind::Deposit => "Deposit",
            EntryKind::Withdrawal => "Withdrawal",
            EntryKind::TransferOut | EntryKind::TransferIn => "Transfer",
        }
    }
}

/// An entry as handed to the store, before an id and timestamp are assigned
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// The account this entry affects
    pub account_id: AccountId,
    /// Strictly positive exact decimal
    pub amount: Decimal,
    /// Direction of the movement
    pub kind: EntryKind,
    /// Free text, never empty by the time it reaches the store
    pub description: String,
}

/// A stored, immutable ledger entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    /// Store-assigned identifier
    pub id: EntryId,

    /// The account this entry affects
    pub account_id: AccountId,

    /// Strictly positive exact decimal; direction is carried by `kind`
    pub amount: Decimal,

    /// Direction of the movement
    pub kind: EntryKind,

    /// Free text, never empty
    pub description: String,

    /// Store-assigned creation timestamp, used for ordering
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_descriptions_are_not_blank() {
        for kind in [
            EntryKind::Deposit,
            EntryKind::Withdrawal,
            EntryKind::TransferOut,
            EntryKind::TransferIn,
        ] {
            assert!(!kind.default_description().trim().is_empty());
        }
    }
}
