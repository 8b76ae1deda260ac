//! Command-line argument parsing for the batch driver

use crate::core::FrozenPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Apply a batch of ledger commands and print the resulting accounts
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Apply a batch of ledger commands and print the resulting accounts", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing ledger commands
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Whether frozen accounts accept incoming funds
    #[arg(
        long = "frozen-deposits",
        value_name = "POLICY",
        default_value = "accept",
        help = "Frozen-account credit policy: 'accept' or 'reject'"
    )]
    pub frozen_deposits: FrozenDeposits,

    /// Bound on lock-wait before an operation times out
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        default_value_t = 5000,
        help = "Milliseconds to wait for an account lock before giving up"
    )]
    pub lock_timeout_ms: u64,
}

/// Frozen-account credit policy as exposed on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FrozenDeposits {
    Accept,
    Reject,
}

impl CliArgs {
    /// The engine-level frozen policy selected by the arguments
    pub fn frozen_policy(&self) -> FrozenPolicy {
        match self.frozen_deposits {
            FrozenDeposits::Accept => FrozenPolicy::AcceptDeposits,
            FrozenDeposits::Reject => FrozenPolicy::RejectDeposits,
        }
    }

    /// The engine-level lock-wait bound selected by the arguments
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
