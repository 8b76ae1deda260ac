//! Core business logic module
//!
//! This module contains the core ledger components:
//! - `account_store` - Account row storage and balance/status writes
//! - `entry_store` - Append-only ledger entry storage
//! - `locks` - Per-account lock table backing atomic units
//! - `engine` - The ledger transaction engine orchestrating all of the above

pub mod account_store;
pub mod engine;
pub mod entry_store;
pub mod locks;

pub use account_store::AccountStore;
pub use engine::{FrozenPolicy, LedgerEngine, TransferOutcome};
pub use entry_store::LedgerEntryStore;
pub use locks::{AccountLocks, UnitGuard};
