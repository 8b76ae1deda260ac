//! Batch command pipeline
//!
//! Wires the streaming reader, the engine, and the account summary writer
//! into one pipeline: read commands in order, apply each through the
//! engine, write the final account states. Rows that fail to parse or are
//! rejected by the engine are logged and skipped; a bad row never stops
//! the batch.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::core::{AccountStore, FrozenPolicy, LedgerEngine, LedgerEntryStore};
use crate::io::{write_accounts_csv, Command, CommandReader};

/// Runs a command batch end to end
///
/// Each run builds fresh stores and a fresh engine, so batches are
/// independent of one another.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    frozen_policy: FrozenPolicy,
    lock_wait: Duration,
}

impl Default for BatchRunner {
    fn default() -> Self {
        BatchRunner {
            frozen_policy: FrozenPolicy::default(),
            lock_wait: Duration::from_secs(5),
        }
    }
}

impl BatchRunner {
    pub fn new() -> Self {
        BatchRunner::default()
    }

    /// Set the frozen-account credit policy for this batch
    pub fn with_frozen_policy(mut self, policy: FrozenPolicy) -> Self {
        self.frozen_policy = policy;
        self
    }

    /// Set the lock-wait bound for this batch
    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }

    /// Apply all commands from `input` and write the account summary to `output`
    ///
    /// Account ids are assigned in `open` order starting at 1, and account
    /// numbers derive from those ids, so output is deterministic for a
    /// given input.
    ///
    /// # Errors
    ///
    /// Returns `Err(String)` only for fatal problems: the input file cannot
    /// be opened, or the summary cannot be written. Per-row failures are
    /// logged as warnings and skipped.
    pub async fn process(&self, input: &Path, output: &mut dyn Write) -> Result<(), String> {
        let accounts = Arc::new(AccountStore::new());
        let entries = Arc::new(LedgerEntryStore::new());
        let engine = LedgerEngine::new(Arc::clone(&accounts), Arc::clone(&entries))
            .with_frozen_policy(self.frozen_policy)
            .with_lock_wait(self.lock_wait);

        let mut opened: u32 = 0;

        for result in CommandReader::new(input)? {
            let command = match result {
                Ok(command) => command,
                Err(e) => {
                    warn!("skipping row: {}", e);
                    continue;
                }
            };

            let outcome = match command {
                Command::Open {
                    owner,
                    kind,
                    initial_balance,
                } => {
                    opened += 1;
                    let number = format!("AC-{}", 1000 + opened);
                    accounts.open(owner, &number, kind, initial_balance);
                    Ok(())
                }
                Command::Deposit {
                    account,
                    amount,
                    description,
                } => engine
                    .deposit(account, amount, &description)
                    .await
                    .map(|_| ()),
                Command::Withdraw {
                    account,
                    amount,
                    description,
                } => engine
                    .withdraw(account, amount, &description)
                    .await
                    .map(|_| ()),
                Command::Transfer {
                    from,
                    to,
                    amount,
                    description,
                } => engine
                    .transfer(from, to, amount, &description)
                    .await
                    .map(|_| ()),
                Command::Close { account } => engine.close_account(account).await,
            };

            if let Err(e) = outcome {
                warn!("command rejected: {}", e);
            }
        }

        write_accounts_csv(&accounts.list_all(), output)
    }
}
