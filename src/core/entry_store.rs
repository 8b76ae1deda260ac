//! Ledger entry storage
//!
//! This module provides the `LedgerEntryStore`, the append-only log of
//! ledger entries. There is no update and no delete on this store — that is
//! a design invariant, not an omission: entries are the audit trail every
//! balance reconciles against, and statement export consumes them strictly
//! read-only.
//!
//! # Ordering
//!
//! Entries are kept per account in append order. The engine only appends
//! while holding the account's lock, so append order and timestamp order
//! agree; `list_by_account` returns most-recent-first.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use crate::types::{AccountId, EntryId, LedgerEntry, NewEntry};

/// Append-only storage for ledger entries
#[derive(Debug, Default)]
pub struct LedgerEntryStore {
    /// Entries per account, in append order
    entries: DashMap<AccountId, Vec<LedgerEntry>>,

    /// Next identifier to assign; ids start at 1 and are global across accounts
    next_id: AtomicU64,
}

impl LedgerEntryStore {
    /// Create an empty store
    pub fn new() -> Self {
        LedgerEntryStore {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append an entry, assigning its id and creation timestamp
    ///
    /// # Returns
    ///
    /// The stored entry.
    pub fn append(&self, new_entry: NewEntry) -> LedgerEntry {
        let id: EntryId = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = LedgerEntry {
            id,
            account_id: new_entry.account_id,
            amount: new_entry.amount,
            kind: new_entry.kind,
            description: new_entry.description,
            created_at: Utc::now(),
        };
        self.entries
            .entry(new_entry.account_id)
            .or_default()
            .push(entry.clone());
        entry
    }

    /// List all entries for an account, most recent first
    ///
    /// An account with no entries yields an empty list; the store does not
    /// distinguish "no entries yet" from "account unknown" — account
    /// existence is the account store's concern.
    pub fn list_by_account(&self, account_id: AccountId) -> Vec<LedgerEntry> {
        match self.entries.get(&account_id) {
            Some(entries) => entries.iter().rev().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Number of entries recorded for an account
    pub fn count_for_account(&self, account_id: AccountId) -> usize {
        self.entries
            .get(&account_id)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;
    use rust_decimal::Decimal;

    fn new_entry(account_id: AccountId, cents: i64, kind: EntryKind) -> NewEntry {
        NewEntry {
            account_id,
            amount: Decimal::new(cents, 2),
            kind,
            description: "test".to_string(),
        }
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let store = LedgerEntryStore::new();

        let first = store.append(new_entry(1, 10_000, EntryKind::Deposit));
        let second = store.append(new_entry(2, 5_000, EntryKind::Withdrawal));

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn list_by_account_is_most_recent_first() {
        let store = LedgerEntryStore::new();
        store.append(new_entry(1, 10_000, EntryKind::Deposit));
        store.append(new_entry(1, 3_000, EntryKind::Withdrawal));
        store.append(new_entry(1, 2_000, EntryKind::TransferOut));

        let entries = store.list_by_account(1);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, EntryKind::TransferOut);
        assert_eq!(entries[1].kind, EntryKind::Withdrawal);
        assert_eq!(entries[2].kind, EntryKind::Deposit);
    }

    #[test]
    fn accounts_do_not_share_entries() {
        let store = LedgerEntryStore::new();
        store.append(new_entry(1, 10_000, EntryKind::Deposit));
        store.append(new_entry(2, 5_000, EntryKind::Deposit));

        assert_eq!(store.count_for_account(1), 1);
        assert_eq!(store.count_for_account(2), 1);
        assert_eq!(store.count_for_account(3), 0);
    }

    #[test]
    fn unknown_account_yields_empty_list() {
        let store = LedgerEntryStore::new();
        assert!(store.list_by_account(99).is_empty());
    }

    #[test]
    fn entries_preserve_amount_and_description() {
        let store = LedgerEntryStore::new();

        let stored = store.append(NewEntry {
            account_id: 1,
            amount: Decimal::new(123_45, 2),
            kind: EntryKind::TransferIn,
            description: "Transfer (from AC-7)".to_string(),
        });

        assert_eq!(stored.amount, Decimal::new(123_45, 2));
        assert_eq!(stored.description, "Transfer (from AC-7)");
        let listed = store.list_by_account(1);
        assert_eq!(listed[0], stored);
    }
}
