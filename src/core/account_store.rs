//! Account storage
//!
//! This module provides the `AccountStore`, the durable-store stand-in for
//! account rows. The real system sits on a relational store; that plumbing
//! is an external collaborator, so this store presents the same narrow
//! interface over a sharded in-memory map.
//!
//! # Concurrency
//!
//! Rows live in a `DashMap`, so individual reads and writes are atomic per
//! row. Reads return committed snapshots without taking the engine's account
//! locks; multi-step read-then-write sequences are the engine's business and
//! run under its per-account atomic units. `compare_and_set_balance` is the
//! unit-scoped write: it re-verifies the balance the caller read before
//! committing, so a write that raced past the engine's locks is detected
//! instead of silently lost.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::types::{Account, AccountId, AccountKind, AccountStatus, LedgerError, OwnerId};

/// Durable storage for account rows
///
/// The store assigns identifiers and creation timestamps; everything else on
/// a row is owned by the caller. Balance writes are the ledger engine's
/// exclusive territory — the standalone [`set_balance`](Self::set_balance)
/// exists for the excluded account-opening/administration flows, not for
/// ledger operations.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Account rows keyed by store-assigned id
    accounts: DashMap<AccountId, Account>,

    /// Next identifier to assign; ids start at 1
    next_id: AtomicU32,
}

impl AccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        AccountStore {
            accounts: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Create an account row
    ///
    /// Called by the account-opening flow, which supplies the externally
    /// generated account number and the opening balance directly (opening
    /// balances are not deposits and produce no ledger entry). The store
    /// assigns the id and creation timestamp.
    ///
    /// # Returns
    ///
    /// The stored account, including its assigned id.
    pub fn open(
        &self,
        owner: OwnerId,
        number: &str,
        kind: AccountKind,
        initial_balance: Decimal,
    ) -> Account {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let account = Account {
            id,
            owner,
            number: number.to_string(),
            kind,
            balance: initial_balance,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        };
        self.accounts.insert(id, account.clone());
        account
    }

    /// Get a committed snapshot of an account
    ///
    /// # Returns
    ///
    /// * `Some(Account)` - a clone of the row as last committed
    /// * `None` - if the id does not exist
    pub fn get(&self, account_id: AccountId) -> Option<Account> {
        self.accounts.get(&account_id).map(|row| row.clone())
    }

    /// List all accounts belonging to an owner, ordered by creation time
    ///
    /// Creation timestamps can collide at clock resolution, so the id is the
    /// tiebreaker (ids are assigned in creation order).
    pub fn list_by_owner(&self, owner: OwnerId) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|row| row.owner == owner)
            .map(|row| row.clone())
            .collect();
        accounts.sort_by_key(|account| (account.created_at, account.id));
        accounts
    }

    /// List every account, ordered by id
    ///
    /// Used by the batch driver for its final summary output.
    pub fn list_all(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> =
            self.accounts.iter().map(|row| row.clone()).collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Overwrite an account's balance unconditionally
    ///
    /// The standalone form for callers that manage their own serialization.
    /// The ledger engine never uses this; it goes through
    /// [`compare_and_set_balance`](Self::compare_and_set_balance) inside its
    /// atomic units.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the id does not exist.
    pub fn set_balance(
        &self,
        account_id: AccountId,
        new_balance: Decimal,
    ) -> Result<(), LedgerError> {
        let mut row = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;
        row.balance = new_balance;
        Ok(())
    }

    /// Overwrite an account's balance only if it still matches `expected`
    ///
    /// The unit-scoped form composed by the engine with entry appends. The
    /// compare and the swap happen under the row's own lock, so the check
    /// cannot itself race.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - the id does not exist
    /// * `ConcurrentModification` - the committed balance no longer matches
    ///   the snapshot the caller read; the caller must abort its unit and
    ///   may retry the whole operation
    pub fn compare_and_set_balance(
        &self,
        account_id: AccountId,
        expected: Decimal,
        new_balance: Decimal,
    ) -> Result<(), LedgerError> {
        let mut row = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;
        if row.balance != expected {
            return Err(LedgerError::concurrent_modification(account_id));
        }
        row.balance = new_balance;
        Ok(())
    }

    /// Set an account's lifecycle status
    ///
    /// Used for account closure and freezing. The store does not verify the
    /// zero-balance closure precondition — that is the engine's job before
    /// it calls here.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the id does not exist.
    pub fn set_status(
        &self,
        account_id: AccountId,
        status: AccountStatus,
    ) -> Result<(), LedgerError> {
        let mut row = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))?;
        row.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 2)
    }

    #[test]
    fn open_assigns_sequential_ids_from_one() {
        let store = AccountStore::new();

        let first = store.open(1, "AC-1001", AccountKind::Chequing, Decimal::ZERO);
        let second = store.open(1, "AC-1002", AccountKind::Savings, Decimal::ZERO);

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, AccountStatus::Active);
    }

    #[test]
    fn open_sets_initial_balance_directly() {
        let store = AccountStore::new();

        let account = store.open(1, "AC-1001", AccountKind::Chequing, dec(500_000));

        assert_eq!(account.balance, dec(500_000));
        assert_eq!(store.get(account.id).unwrap().balance, dec(500_000));
    }

    #[test]
    fn get_unknown_id_returns_none() {
        let store = AccountStore::new();
        assert!(store.get(99).is_none());
    }

    #[test]
    fn get_returns_snapshot_not_live_row() {
        let store = AccountStore::new();
        let account = store.open(1, "AC-1001", AccountKind::Chequing, Decimal::ZERO);

        let snapshot = store.get(account.id).unwrap();
        store.set_balance(account.id, dec(100)).unwrap();

        assert_eq!(snapshot.balance, Decimal::ZERO);
        assert_eq!(store.get(account.id).unwrap().balance, dec(100));
    }

    #[test]
    fn list_by_owner_filters_and_orders_by_creation() {
        let store = AccountStore::new();
        store.open(1, "AC-1001", AccountKind::Chequing, Decimal::ZERO);
        store.open(2, "AC-2001", AccountKind::Chequing, Decimal::ZERO);
        store.open(1, "AC-1002", AccountKind::Savings, Decimal::ZERO);

        let accounts = store.list_by_owner(1);

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].number, "AC-1001");
        assert_eq!(accounts[1].number, "AC-1002");
    }

    #[test]
    fn set_balance_on_unknown_account_fails() {
        let store = AccountStore::new();

        let result = store.set_balance(42, dec(100));

        assert_eq!(result, Err(LedgerError::account_not_found(42)));
    }

    #[test]
    fn compare_and_set_succeeds_when_balance_unchanged() {
        let store = AccountStore::new();
        let account = store.open(1, "AC-1001", AccountKind::Chequing, dec(10_000));

        let result = store.compare_and_set_balance(account.id, dec(10_000), dec(7_500));

        assert!(result.is_ok());
        assert_eq!(store.get(account.id).unwrap().balance, dec(7_500));
    }

    #[test]
    fn compare_and_set_detects_conflicting_write() {
        let store = AccountStore::new();
        let account = store.open(1, "AC-1001", AccountKind::Chequing, dec(10_000));

        // Another writer slipped in after our snapshot.
        store.set_balance(account.id, dec(9_000)).unwrap();

        let result = store.compare_and_set_balance(account.id, dec(10_000), dec(7_500));

        assert_eq!(
            result,
            Err(LedgerError::concurrent_modification(account.id))
        );
        // The conflicting write stays; ours was never applied.
        assert_eq!(store.get(account.id).unwrap().balance, dec(9_000));
    }

    #[test]
    fn set_status_transitions_row() {
        let store = AccountStore::new();
        let account = store.open(1, "AC-1001", AccountKind::Chequing, Decimal::ZERO);

        store.set_status(account.id, AccountStatus::Frozen).unwrap();
        assert_eq!(store.get(account.id).unwrap().status, AccountStatus::Frozen);

        store.set_status(account.id, AccountStatus::Closed).unwrap();
        assert_eq!(store.get(account.id).unwrap().status, AccountStatus::Closed);
    }
}
