//! Core data types for the ledger engine
//!
//! - [`account`] - Account rows, kind and status enumerations
//! - [`entry`] - Immutable ledger entries and their kinds
//! - [`error`] - The [`LedgerError`] taxonomy

pub mod account;
pub mod entry;
pub mod error;

pub use account::{Account, AccountId, AccountKind, AccountStatus, OwnerId};
pub use entry::{EntryId, EntryKind, LedgerEntry, NewEntry};
pub use error::LedgerError;
