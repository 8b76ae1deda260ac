//! Ledger Engine Library
//! # Overview
//!
//! This library provides the transaction engine of a personal-finance
//! ledger: exact-decimal account balances, an append-only ledger of entries,
//! and atomic deposit/withdraw/transfer operations safe under concurrency.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, LedgerEntry, LedgerError)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - The ledger engine orchestrating all balance changes
//!   - [`core::account_store`] - Account row storage
//!   - [`core::entry_store`] - Append-only ledger entry storage
//!   - [`core::locks`] - Per-account lock table backing atomic units
//! - [`io`] - Batch command input and account summary output
//! - [`batch`] - The batch pipeline wiring reader, engine, and output
//!
//! # Operations
//!
//! The engine supports four balance-affecting operations:
//!
//! - **Deposit**: Credit funds to an account
//! - **Withdrawal**: Debit funds from an account (requires sufficient balance)
//! - **Transfer**: Move funds between two accounts, recorded as a
//!   `TransferOut` entry on the source and a `TransferIn` entry on the
//!   destination, committed atomically
//! - **Close**: Retire an account whose balance is exactly zero
//!
//! # Invariants
//!
//! - Every balance change is paired with a ledger entry carrying the same
//!   amount; replaying an account's entries reproduces its balance
//! - Entries are never updated or deleted
//! - A failed operation leaves no observable state change
//! - Money amounts are exact decimals; no floating point anywhere

pub mod batch;
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use core::{AccountStore, FrozenPolicy, LedgerEngine, LedgerEntryStore, TransferOutcome};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, AccountKind, AccountStatus, EntryId, EntryKind, LedgerEntry, LedgerError,
    NewEntry, OwnerId,
};
