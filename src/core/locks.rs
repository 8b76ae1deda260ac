//! Per-account locking for atomic units of work
//!
//! Every engine operation that reads a balance and writes it back runs
//! inside an atomic unit scoped to the accounts it touches. This module
//! provides the lock table backing those units: one async mutex per
//! account, acquired at the start of the operation and released on every
//! exit path when the guard drops.
//!
//! # Deadlock prevention
//!
//! Transfers lock two accounts. Both locks are always acquired in
//! ascending account-id order, so two transfers moving money in opposite
//! directions between the same pair cannot deadlock.
//!
//! # Lock-wait bound
//!
//! Acquisition is bounded by a caller-configured wait. Expiry surfaces as
//! `OperationTimedOut` — a retryable failure, never a partial commit.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

use crate::types::{AccountId, LedgerError};

/// An acquired atomic unit's lock scope
///
/// Holds one guard for single-account units, two for transfers. Dropping
/// the guard releases the unit; there is no explicit unlock.
#[derive(Debug)]
pub struct UnitGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

/// Lock table keyed by account id
///
/// Lock entries are created on first use and kept for the account's
/// lifetime — accounts are never deleted, so the table only grows with the
/// account population.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        AccountLocks {
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, account_id: AccountId) -> Arc<Mutex<()>> {
        self.locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn acquire_one(
        &self,
        account_id: AccountId,
        operation: &str,
        wait: Duration,
    ) -> Result<OwnedMutexGuard<()>, LedgerError> {
        let lock = self.lock_for(account_id);
        timeout(wait, lock.lock_owned())
            .await
            .map_err(|_| LedgerError::operation_timed_out(account_id, operation))
    }

    /// Acquire a single-account unit
    ///
    /// # Errors
    ///
    /// Returns `OperationTimedOut` if the lock cannot be acquired within
    /// `wait`.
    pub async fn acquire(
        &self,
        account_id: AccountId,
        operation: &str,
        wait: Duration,
    ) -> Result<UnitGuard, LedgerError> {
        let guard = self.acquire_one(account_id, operation, wait).await?;
        Ok(UnitGuard {
            _guards: vec![guard],
        })
    }

    /// Acquire a two-account unit in ascending account-id order
    ///
    /// The caller passes the accounts in any order; acquisition order is
    /// fixed here.
    ///
    /// # Errors
    ///
    /// Returns `OperationTimedOut` naming the account whose lock expired
    /// the wait. A timeout on the second lock releases the first before
    /// surfacing.
    pub async fn acquire_pair(
        &self,
        first: AccountId,
        second: AccountId,
        operation: &str,
        wait: Duration,
    ) -> Result<UnitGuard, LedgerError> {
        debug_assert_ne!(first, second, "pair units require distinct accounts");

        let (low, high) = if first < second {
            (first, second)
        } else {
            (second, first)
        };

        let low_guard = self.acquire_one(low, operation, wait).await?;
        // If this times out, dropping low_guard on the error path releases
        // the lock already held.
        let high_guard = self.acquire_one(high, operation, wait).await?;

        Ok(UnitGuard {
            _guards: vec![low_guard, high_guard],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn acquire_and_release() {
        let locks = AccountLocks::new();

        let guard = locks.acquire(1, "deposit", WAIT).await.unwrap();
        drop(guard);

        // Re-acquirable after release.
        let _guard = locks.acquire(1, "deposit", WAIT).await.unwrap();
    }

    #[tokio::test]
    async fn held_lock_times_out_second_caller() {
        let locks = AccountLocks::new();

        let _held = locks.acquire(1, "withdraw", WAIT).await.unwrap();
        let result = locks.acquire(1, "withdraw", Duration::from_millis(20)).await;

        assert_eq!(
            result.map(|_| ()),
            Err(LedgerError::operation_timed_out(1, "withdraw"))
        );
    }

    #[tokio::test]
    async fn different_accounts_do_not_contend() {
        let locks = AccountLocks::new();

        let _a = locks.acquire(1, "deposit", WAIT).await.unwrap();
        let _b = locks.acquire(2, "deposit", WAIT).await.unwrap();
    }

    #[tokio::test]
    async fn pair_acquisition_is_order_insensitive() {
        let locks = Arc::new(AccountLocks::new());

        // Opposite-direction pairs taken repeatedly from two tasks; ordered
        // acquisition means this cannot deadlock and both tasks finish.
        let forward = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                for _ in 0..100 {
                    let _unit = locks.acquire_pair(1, 2, "transfer", WAIT).await.unwrap();
                }
            })
        };
        let backward = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                for _ in 0..100 {
                    let _unit = locks.acquire_pair(2, 1, "transfer", WAIT).await.unwrap();
                }
            })
        };

        forward.await.unwrap();
        backward.await.unwrap();
    }

    #[tokio::test]
    async fn pair_timeout_releases_first_lock() {
        let locks = AccountLocks::new();

        let _held = locks.acquire(2, "withdraw", WAIT).await.unwrap();

        // Pair (1, 2): lock 1 is taken first, then 2 times out.
        let result = locks
            .acquire_pair(1, 2, "transfer", Duration::from_millis(20))
            .await;
        assert_eq!(
            result.map(|_| ()),
            Err(LedgerError::operation_timed_out(2, "transfer"))
        );

        // Lock 1 must have been released on the error path.
        let _one = locks.acquire(1, "deposit", WAIT).await.unwrap();
    }
}
