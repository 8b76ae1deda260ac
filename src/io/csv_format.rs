//! CSV format handling for batch commands and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to ledger commands
//! - Account summary serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Account, AccountId, AccountKind, OwnerId};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the batch input format with columns:
/// `type,account,to,amount,description`. Most columns are optional because
/// each command uses a different subset:
///
/// - `open` - account column holds the owner id, amount the opening
///   balance, description the account kind (`chequing`/`savings`,
///   defaulting to chequing)
/// - `deposit` / `withdraw` - account, amount, optional description
/// - `transfer` - account (source), to (destination), amount, description
/// - `close` - account only
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub command: String,
    pub account: Option<u32>,
    pub to: Option<u32>,
    pub amount: Option<String>,
    pub description: Option<String>,
}

/// A parsed batch command, ready for the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open {
        owner: OwnerId,
        kind: AccountKind,
        initial_balance: Decimal,
    },
    Deposit {
        account: AccountId,
        amount: Decimal,
        description: String,
    },
    Withdraw {
        account: AccountId,
        amount: Decimal,
        description: String,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        description: String,
    },
    Close {
        account: AccountId,
    },
}

/// Convert a CsvRecord to a Command
///
/// This function:
/// - Parses the command type string (case-insensitive)
/// - Parses the amount string into a Decimal where the command needs one
/// - Validates that the columns each command requires are present
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(Command) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Command, String> {
    let command = csv_record.command.to_lowercase();

    let account = || {
        csv_record
            .account
            .ok_or_else(|| format!("'{}' command requires an account", command))
    };
    let amount = || parse_amount(csv_record.amount.as_deref(), &command);
    let description = || {
        csv_record
            .description
            .clone()
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    match command.as_str() {
        "open" => {
            let owner = csv_record
                .account
                .ok_or_else(|| "'open' command requires an owner id".to_string())?;
            let kind = match description().to_lowercase().as_str() {
                "" | "chequing" => AccountKind::Chequing,
                "savings" => AccountKind::Savings,
                other => return Err(format!("Invalid account kind: '{}'", other)),
            };
            Ok(Command::Open {
                owner,
                kind,
                initial_balance: amount()?,
            })
        }
        "deposit" => Ok(Command::Deposit {
            account: account()?,
            amount: amount()?,
            description: description(),
        }),
        "withdraw" => Ok(Command::Withdraw {
            account: account()?,
            amount: amount()?,
            description: description(),
        }),
        "transfer" => Ok(Command::Transfer {
            from: account()?,
            to: csv_record
                .to
                .ok_or_else(|| "'transfer' command requires a destination account".to_string())?,
            amount: amount()?,
            description: description(),
        }),
        "close" => Ok(Command::Close { account: account()? }),
        _ => Err(format!("Invalid command type: '{}'", csv_record.command)),
    }
}

fn parse_amount(raw: Option<&str>, command: &str) -> Result<Decimal, String> {
    match raw {
        Some(text) if !text.trim().is_empty() => Decimal::from_str(text.trim())
            .map_err(|_| format!("Invalid amount '{}' for '{}' command", text, command)),
        _ => Err(format!("'{}' command requires an amount", command)),
    }
}

/// Write account summaries to CSV format
///
/// Writes accounts with columns: id, owner, number, kind, balance, status.
/// Accounts are sorted by id for deterministic output; balances are printed
/// with two decimal places.
///
/// # Arguments
///
/// * `accounts` - Slice of account states to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["id", "owner", "number", "kind", "balance", "status"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id.to_string(),
                account.owner.to_string(),
                account.number.clone(),
                account.kind.as_str().to_string(),
                format!("{:.2}", account.balance),
                account.status.as_str().to_string(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
