//! Error types for the ledger engine
//!
//! Every failure an operation can signal is a variant of [`LedgerError`].
//! Business-rule failures (invalid amount, missing account, insufficient
//! funds, ...) are detected before any write and are terminal for the call.
//! Failures detected inside an atomic unit (conflicting concurrent write,
//! lock-wait expiry, storage outage) force a full rollback first and are
//! safe to retry a bounded number of times — see [`LedgerError::is_retryable`].

use rust_decimal::Decimal;
use thiserror::Error;

use super::account::AccountId;

/// Main error type for the ledger engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount missing, zero, or negative
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The offending amount
        amount: Decimal,
        /// Why it was rejected
        reason: String,
    },

    /// Referenced account identifier does not exist
    #[error("Account {account_id} not found")]
    AccountNotFound {
        /// The identifier that was looked up
        account_id: AccountId,
    },

    /// Operation attempted against a CLOSED account
    #[error("Account {account_id} is closed")]
    AccountClosed {
        /// The closed account
        account_id: AccountId,
    },

    /// Operation attempted against a FROZEN account and rejected by policy
    #[error("Account {account_id} is frozen ({operation} rejected)")]
    AccountFrozen {
        /// The frozen account
        account_id: AccountId,
        /// Operation that was rejected
        operation: String,
    },

    /// Withdrawal or transfer-out would drive the balance negative
    #[error(
        "Insufficient funds on account {account_id}: balance {balance}, requested {requested}"
    )]
    InsufficientFunds {
        /// The debited account
        account_id: AccountId,
        /// Committed balance at the time of the check
        balance: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Transfer source and destination are the same account
    #[error("Cannot transfer from account {account_id} to itself")]
    SameAccount {
        /// The account named on both sides
        account_id: AccountId,
    },

    /// Account closure requested while money remains on the account
    #[error("Account {account_id} still holds {balance}; balance must be zero to close")]
    BalanceNotZero {
        /// The account being closed
        account_id: AccountId,
        /// Its current balance
        balance: Decimal,
    },

    /// A conflicting concurrent write was detected at commit; safe to retry
    #[error("Concurrent modification of account {account_id} detected")]
    ConcurrentModification {
        /// The contended account
        account_id: AccountId,
    },

    /// The atomic unit could not be acquired within the allowed wait; safe to retry
    #[error("Timed out waiting to lock account {account_id} for {operation}")]
    OperationTimedOut {
        /// The account whose lock could not be acquired
        account_id: AccountId,
        /// Operation that gave up
        operation: String,
    },

    /// Checked decimal arithmetic failed
    ///
    /// The operation is rejected rather than committing a wrapped or
    /// saturated balance.
    #[error("Arithmetic overflow in {operation} for account {account_id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Affected account
        account_id: AccountId,
    },

    /// Underlying persistence failed for reasons unrelated to business rules
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of the storage failure
        message: String,
    },
}

// Helper constructors, kept next to the enum so call sites stay short

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, reason: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            reason: reason.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account_id: AccountId) -> Self {
        LedgerError::AccountNotFound { account_id }
    }

    /// Create an AccountClosed error
    pub fn account_closed(account_id: AccountId) -> Self {
        LedgerError::AccountClosed { account_id }
    }

    /// Create an AccountFrozen error
    pub fn account_frozen(account_id: AccountId, operation: &str) -> Self {
        LedgerError::AccountFrozen {
            account_id,
            operation: operation.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account_id: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account_id,
            balance,
            requested,
        }
    }

    /// Create a SameAccount error
    pub fn same_account(account_id: AccountId) -> Self {
        LedgerError::SameAccount { account_id }
    }

    /// Create a BalanceNotZero error
    pub fn balance_not_zero(account_id: AccountId, balance: Decimal) -> Self {
        LedgerError::BalanceNotZero {
            account_id,
            balance,
        }
    }

    /// Create a ConcurrentModification error
    pub fn concurrent_modification(account_id: AccountId) -> Self {
        LedgerError::ConcurrentModification { account_id }
    }

    /// Create an OperationTimedOut error
    pub fn operation_timed_out(account_id: AccountId, operation: &str) -> Self {
        LedgerError::OperationTimedOut {
            account_id,
            operation: operation.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account_id: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account_id,
        }
    }

    /// Create a StorageUnavailable error
    pub fn storage_unavailable(message: &str) -> Self {
        LedgerError::StorageUnavailable {
            message: message.to_string(),
        }
    }

    /// Whether the caller may safely retry the whole operation
    ///
    /// True only for failures detected *during* the atomic unit, after which
    /// a full rollback already happened. Business-rule failures are terminal
    /// for the call and must be shown to the user instead.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::ConcurrentModification { .. } | LedgerError::OperationTimedOut { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::invalid_amount(
        LedgerError::invalid_amount(Decimal::ZERO, "amount must be positive"),
        "Invalid amount 0: amount must be positive"
    )]
    #[case::account_not_found(
        LedgerError::account_not_found(7),
        "Account 7 not found"
    )]
    #[case::account_closed(
        LedgerError::account_closed(3),
        "Account 3 is closed"
    )]
    #[case::account_frozen(
        LedgerError::account_frozen(3, "withdrawal"),
        "Account 3 is frozen (withdrawal rejected)"
    )]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds(1, Decimal::new(10000, 2), Decimal::new(50000, 2)),
        "Insufficient funds on account 1: balance 100.00, requested 500.00"
    )]
    #[case::same_account(
        LedgerError::same_account(9),
        "Cannot transfer from account 9 to itself"
    )]
    #[case::balance_not_zero(
        LedgerError::balance_not_zero(4, Decimal::new(125, 2)),
        "Account 4 still holds 1.25; balance must be zero to close"
    )]
    #[case::concurrent_modification(
        LedgerError::concurrent_modification(2),
        "Concurrent modification of account 2 detected"
    )]
    #[case::timed_out(
        LedgerError::operation_timed_out(2, "transfer"),
        "Timed out waiting to lock account 2 for transfer"
    )]
    #[case::overflow(
        LedgerError::arithmetic_overflow("deposit", 1),
        "Arithmetic overflow in deposit for account 1"
    )]
    #[case::storage(
        LedgerError::storage_unavailable("connection refused"),
        "Storage unavailable: connection refused"
    )]
    fn error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn only_unit_failures_are_retryable() {
        assert!(LedgerError::concurrent_modification(1).is_retryable());
        assert!(LedgerError::operation_timed_out(1, "deposit").is_retryable());

        assert!(!LedgerError::account_not_found(1).is_retryable());
        assert!(!LedgerError::insufficient_funds(1, Decimal::ZERO, Decimal::ONE).is_retryable());
        assert!(!LedgerError::same_account(1).is_retryable());
        assert!(!LedgerError::storage_unavailable("down").is_retryable());
    }
}
