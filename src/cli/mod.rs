//! CLI argument parsing module

pub mod args;

pub use args::{CliArgs, FrozenDeposits};

use clap::Parser;

/// Parse command-line arguments, exiting with a usage message on failure
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
