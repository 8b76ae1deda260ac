//! Ledger Engine CLI
//!
//! Command-line interface for applying batches of ledger commands from CSV
//! files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > accounts.csv
//! cargo run -- --frozen-deposits reject commands.csv > accounts.csv
//! cargo run -- --lock-timeout-ms 250 commands.csv > accounts.csv
//! ```
//!
//! The program reads commands from the input CSV file, applies them through
//! the ledger engine in order, and outputs the final account states to
//! stdout. Rows that fail to parse or are rejected by the engine are logged
//! as warnings and skipped; a bad row never stops the batch.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use std::process;

use tracing_subscriber::EnvFilter;

use ledger_engine::batch::BatchRunner;
use ledger_engine::cli;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; stdout is reserved for the account summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let runner = BatchRunner::new()
        .with_frozen_policy(args.frozen_policy())
        .with_lock_wait(args.lock_wait());

    let mut output = std::io::stdout();
    if let Err(e) = runner.process(&args.input_file, &mut output).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
