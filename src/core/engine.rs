//! The ledger transaction engine
//!
//! This module provides the `LedgerEngine`, the sole authority for changing
//! account balances. Every balance change is paired with a ledger entry, and
//! multi-account operations are all-or-nothing: the engine opens one atomic
//! unit per operation (per-account locks from [`AccountLocks`]), validates
//! every business rule before the first write, then commits balance writes
//! followed by entry appends inside that unit.
//!
//! # Failure behavior
//!
//! Business-rule failures (`InvalidAmount`, `AccountNotFound`,
//! `AccountClosed`, `AccountFrozen`, `InsufficientFunds`, `SameAccount`,
//! `BalanceNotZero`) are detected before any write and returned directly.
//! Failures inside the unit (`ConcurrentModification`, `OperationTimedOut`)
//! roll back fully and are retried internally a bounded number of times
//! before surfacing. Either way a failed call leaves balances and entry
//! counts exactly as they were.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::account_store::AccountStore;
use crate::core::entry_store::LedgerEntryStore;
use crate::core::locks::AccountLocks;
use crate::types::{
    Account, AccountId, AccountStatus, EntryKind, LedgerEntry, LedgerError, NewEntry, OwnerId,
};

/// Upper bound on internal retries of a retryable unit failure
const MAX_UNIT_ATTEMPTS: u32 = 3;

/// Default bound on lock-wait before an operation gives up
const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// Policy for credits against a FROZEN account
///
/// A freeze always rejects withdrawals and transfers-out. Whether deposits
/// (and transfers-in) are still accepted is a product decision the reference
/// system never pinned down, so it is configurable here rather than
/// hard-coded. The default accepts credits: a freeze stops money leaving,
/// not arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrozenPolicy {
    /// Frozen accounts still accept deposits and transfers-in (default)
    #[default]
    AcceptDeposits,
    /// Frozen accounts reject all operations
    RejectDeposits,
}

/// Both post-transfer balances, returned on success
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferOutcome {
    /// New balance of the debited account
    pub from_balance: Decimal,
    /// New balance of the credited account
    pub to_balance: Decimal,
}

/// The ledger transaction engine
///
/// Holds shared handles to the two stores plus the per-account lock table.
/// Store handles are injected at construction; their lifecycle belongs to
/// the process entry point, not to the engine. The engine is cheap to share
/// behind an `Arc` and all operations take `&self`, so concurrent callers
/// need no external synchronization.
#[derive(Debug)]
pub struct LedgerEngine {
    accounts: Arc<AccountStore>,
    entries: Arc<LedgerEntryStore>,
    locks: AccountLocks,
    frozen_policy: FrozenPolicy,
    lock_wait: Duration,
}

impl LedgerEngine {
    /// Create an engine over the given stores with default policy and lock wait
    pub fn new(accounts: Arc<AccountStore>, entries: Arc<LedgerEntryStore>) -> Self {
        LedgerEngine {
            accounts,
            entries,
            locks: AccountLocks::new(),
            frozen_policy: FrozenPolicy::default(),
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }

    /// Set the frozen-account credit policy
    pub fn with_frozen_policy(mut self, policy: FrozenPolicy) -> Self {
        self.frozen_policy = policy;
        self
    }

    /// Set the bound on lock-wait before operations fail with `OperationTimedOut`
    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }

    /// Deposit money into an account
    ///
    /// Within one atomic unit: verifies the account exists and accepts
    /// credits, computes the new balance with exact decimal addition,
    /// persists it, then appends a `Deposit` entry with the same amount.
    ///
    /// # Arguments
    ///
    /// * `account_id` - the credited account
    /// * `amount` - strictly positive exact decimal
    /// * `description` - free text; blank text is replaced with a default
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// `InvalidAmount`, `AccountNotFound`, `AccountClosed`, `AccountFrozen`
    /// (policy-dependent), `ArithmeticOverflow`, or a retryable unit failure
    /// that exhausted its retries.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Decimal, LedgerError> {
        validate_amount(amount)?;
        self.run_unit(|| self.deposit_once(account_id, amount, description))
            .await
    }

    /// Withdraw money from an account
    ///
    /// Same shape as [`deposit`](Self::deposit), with two extra rules: a
    /// frozen account always rejects withdrawals, and the balance must cover
    /// the amount (withdrawing the exact balance succeeds, leaving zero).
    ///
    /// # Returns
    ///
    /// The new balance.
    ///
    /// # Errors
    ///
    /// As for deposit, plus `InsufficientFunds`.
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Decimal, LedgerError> {
        validate_amount(amount)?;
        self.run_unit(|| self.withdraw_once(account_id, amount, description))
            .await
    }

    /// Move money between two accounts
    ///
    /// Opens one atomic unit spanning both accounts (locks taken in
    /// ascending id order), validates both sides, then commits both balance
    /// writes followed by a `TransferOut` entry on the source and a
    /// `TransferIn` entry on the destination. Each entry's description
    /// references the counterpart account number for traceability. Either
    /// all four writes are observable or none.
    ///
    /// # Returns
    ///
    /// Both new balances.
    ///
    /// # Errors
    ///
    /// `SameAccount`, `InvalidAmount`, `AccountNotFound` / `AccountClosed`
    /// for either side, `AccountFrozen` for a frozen source (and, by
    /// policy, a frozen destination), `InsufficientFunds` on the source,
    /// or a retryable unit failure that exhausted its retries.
    pub async fn transfer(
        &self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<TransferOutcome, LedgerError> {
        if from_account_id == to_account_id {
            return Err(LedgerError::same_account(from_account_id));
        }
        validate_amount(amount)?;
        self.run_unit(|| self.transfer_once(from_account_id, to_account_id, amount, description))
            .await
    }

    /// Close an account
    ///
    /// The balance must be exactly zero at the moment of closure; a closed
    /// account rejects every subsequent operation. Closing an
    /// already-closed account fails with `AccountClosed`. A frozen account
    /// with zero balance may be closed — freezing restricts money movement,
    /// not lifecycle.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`, `AccountClosed`, `BalanceNotZero`, or a lock-wait
    /// timeout.
    pub async fn close_account(&self, account_id: AccountId) -> Result<(), LedgerError> {
        let _unit = self.locks.acquire(account_id, "close", self.lock_wait).await?;

        let account = self.require_account(account_id)?;
        if account.status == AccountStatus::Closed {
            return Err(LedgerError::account_closed(account_id));
        }
        if !account.balance.is_zero() {
            return Err(LedgerError::balance_not_zero(account_id, account.balance));
        }

        self.accounts.set_status(account_id, AccountStatus::Closed)?;
        debug!(account = account_id, "account closed");
        Ok(())
    }

    /// Committed snapshot of an account
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the id does not exist.
    pub fn account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.require_account(account_id)
    }

    /// Committed balance of an account
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the id does not exist.
    pub fn balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        Ok(self.require_account(account_id)?.balance)
    }

    /// All accounts of an owner, ordered by creation time
    pub fn accounts_for_owner(&self, owner: OwnerId) -> Vec<Account> {
        self.accounts.list_by_owner(owner)
    }

    /// All ledger entries of an account, most recent first
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the id does not exist.
    pub fn statement(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.require_account(account_id)?;
        Ok(self.entries.list_by_account(account_id))
    }

    // --- internals -------------------------------------------------------

    /// Run a unit-scoped operation, retrying bounded on retryable failures
    async fn run_unit<T, F, Fut>(&self, attempt: F) -> Result<T, LedgerError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, LedgerError>>,
    {
        let mut tries = 0;
        loop {
            match attempt().await {
                Err(err) if err.is_retryable() && tries + 1 < MAX_UNIT_ATTEMPTS => {
                    tries += 1;
                    debug!(retry = tries, error = %err, "retrying unit after retryable failure");
                }
                other => return other,
            }
        }
    }

    async fn deposit_once(
        &self,
        account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Decimal, LedgerError> {
        let _unit = self
            .locks
            .acquire(account_id, "deposit", self.lock_wait)
            .await?;

        let account = self.require_account(account_id)?;
        self.check_credit_allowed(&account, "deposit")?;

        let new_balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", account_id))?;

        self.accounts
            .compare_and_set_balance(account_id, account.balance, new_balance)?;
        self.entries.append(NewEntry {
            account_id,
            amount,
            kind: EntryKind::Deposit,
            description: describe(description, EntryKind::Deposit),
        });

        debug!(account = account_id, %amount, balance = %new_balance, "deposit applied");
        Ok(new_balance)
    }

    async fn withdraw_once(
        &self,
        account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Decimal, LedgerError> {
        let _unit = self
            .locks
            .acquire(account_id, "withdraw", self.lock_wait)
            .await?;

        let account = self.require_account(account_id)?;
        self.check_debit_allowed(&account, "withdrawal")?;

        if account.balance < amount {
            return Err(LedgerError::insufficient_funds(
                account_id,
                account.balance,
                amount,
            ));
        }

        let new_balance = account
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("withdrawal", account_id))?;

        self.accounts
            .compare_and_set_balance(account_id, account.balance, new_balance)?;
        self.entries.append(NewEntry {
            account_id,
            amount,
            kind: EntryKind::Withdrawal,
            description: describe(description, EntryKind::Withdrawal),
        });

        debug!(account = account_id, %amount, balance = %new_balance, "withdrawal applied");
        Ok(new_balance)
    }

    async fn transfer_once(
        &self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<TransferOutcome, LedgerError> {
        let _unit = self
            .locks
            .acquire_pair(from_account_id, to_account_id, "transfer", self.lock_wait)
            .await?;

        // Both reads happen inside the unit, so they observe a consistent
        // snapshot relative to other engine operations.
        let from_account = self.require_account(from_account_id)?;
        let to_account = self.require_account(to_account_id)?;

        self.check_debit_allowed(&from_account, "transfer")?;
        self.check_credit_allowed(&to_account, "transfer")?;

        if from_account.balance < amount {
            return Err(LedgerError::insufficient_funds(
                from_account_id,
                from_account.balance,
                amount,
            ));
        }

        let new_from_balance = from_account
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", from_account_id))?;
        let new_to_balance = to_account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", to_account_id))?;

        // Commit: both balances, then both entries. A conflict on the
        // second write restores the first before surfacing — the unit still
        // holds both locks, so the restore cannot itself race an engine
        // operation.
        self.accounts.compare_and_set_balance(
            from_account_id,
            from_account.balance,
            new_from_balance,
        )?;
        if let Err(err) =
            self.accounts
                .compare_and_set_balance(to_account_id, to_account.balance, new_to_balance)
        {
            self.accounts
                .set_balance(from_account_id, from_account.balance)?;
            warn!(
                from = from_account_id,
                to = to_account_id,
                error = %err,
                "transfer rolled back"
            );
            return Err(err);
        }

        self.entries.append(NewEntry {
            account_id: from_account_id,
            amount,
            kind: EntryKind::TransferOut,
            description: format!(
                "{} (to {})",
                describe(description, EntryKind::TransferOut),
                to_account.number
            ),
        });
        self.entries.append(NewEntry {
            account_id: to_account_id,
            amount,
            kind: EntryKind::TransferIn,
            description: format!(
                "{} (from {})",
                describe(description, EntryKind::TransferIn),
                from_account.number
            ),
        });

        debug!(
            from = from_account_id,
            to = to_account_id,
            %amount,
            "transfer applied"
        );
        Ok(TransferOutcome {
            from_balance: new_from_balance,
            to_balance: new_to_balance,
        })
    }

    fn require_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| LedgerError::account_not_found(account_id))
    }

    /// A credit (deposit, transfer-in) requires a non-closed account; for a
    /// frozen account the configured policy decides.
    fn check_credit_allowed(&self, account: &Account, operation: &str) -> Result<(), LedgerError> {
        match account.status {
            AccountStatus::Active => Ok(()),
            AccountStatus::Closed => Err(LedgerError::account_closed(account.id)),
            AccountStatus::Frozen => match self.frozen_policy {
                FrozenPolicy::AcceptDeposits => Ok(()),
                FrozenPolicy::RejectDeposits => {
                    Err(LedgerError::account_frozen(account.id, operation))
                }
            },
        }
    }

    /// A debit (withdrawal, transfer-out) requires an active account.
    fn check_debit_allowed(&self, account: &Account, operation: &str) -> Result<(), LedgerError> {
        match account.status {
            AccountStatus::Active => Ok(()),
            AccountStatus::Closed => Err(LedgerError::account_closed(account.id)),
            AccountStatus::Frozen => Err(LedgerError::account_frozen(account.id, operation)),
        }
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(
            amount,
            "amount must be positive",
        ));
    }
    Ok(())
}

/// Substitute a per-kind default when the caller supplied blank text
fn describe(description: &str, kind: EntryKind) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        kind.default_description().to_string()
    } else {
        trimmed.to_string()
    }
}
