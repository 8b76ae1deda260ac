//! Streaming CSV reader with iterator interface
//!
//! Provides a streaming iterator over batch commands from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the
//!   iterator, with line numbers for debugging
//!
//! # Memory Efficiency
//!
//! Records are read one at a time; memory usage is O(1) per record, not
//! O(file_size).

use crate::io::csv_format::{convert_csv_record, Command, CsvRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Streaming CSV command reader
///
/// Implements `Iterator`, yielding `Result<Command, String>` per CSV row:
///
/// ```no_run
/// use ledger_engine::io::reader::CommandReader;
/// use std::path::Path;
///
/// let reader = CommandReader::new(Path::new("commands.csv")).unwrap();
/// for result in reader {
///     match result {
///         Ok(command) => println!("Processing: {:?}", command),
///         Err(e) => eprintln!("Error: {}", e),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct CommandReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl CommandReader {
    /// Create a new CommandReader from a file path
    ///
    /// The CSV reader is configured to trim whitespace from all fields and
    /// allow flexible field counts (trailing optional columns may be
    /// omitted).
    ///
    /// # Errors
    ///
    /// Returns `Err(String)` if the file could not be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for CommandReader {
    type Item = Result<Command, String>;

    /// Get the next command from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Command))` - Successfully parsed record
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();

        match deserializer.next()? {
            Ok(csv_record) => {
                self.line_num += 1;
                // Line 1 is the header row.
                Some(
                    convert_csv_record(csv_record)
                        .map_err(|e| format!("Line {}: {}", self.line_num + 1, e)),
                )
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(format!(
                    "Line {}: CSV parse error: {}",
                    self.line_num + 1,
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn new_opens_existing_file() {
        let file = create_temp_csv("type,account,to,amount,description\n");

        assert!(CommandReader::new(file.path()).is_ok());
    }

    #[test]
    fn new_fails_on_missing_file() {
        let result = CommandReader::new(Path::new("nonexistent.csv"));

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn iterates_valid_commands_in_order() {
        let file = create_temp_csv(
            "type,account,to,amount,description\n\
             open,1,,5000.00,chequing\n\
             deposit,1,,1000.00,payday\n\
             transfer,1,2,200.00,rent\n\
             close,2,,,\n",
        );

        let commands: Vec<_> = CommandReader::new(file.path()).unwrap().collect();

        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0],
            Ok(Command::Open {
                owner: 1,
                kind: crate::types::AccountKind::Chequing,
                initial_balance: Decimal::new(500_000, 2),
            })
        );
        assert_eq!(
            commands[1],
            Ok(Command::Deposit {
                account: 1,
                amount: Decimal::new(100_000, 2),
                description: "payday".to_string(),
            })
        );
        assert!(matches!(commands[2], Ok(Command::Transfer { .. })));
        assert_eq!(commands[3], Ok(Command::Close { account: 2 }));
    }

    #[test]
    fn bad_rows_yield_errors_with_line_numbers() {
        let file = create_temp_csv(
            "type,account,to,amount,description\n\
             deposit,1,,100.00,\n\
             freeze,1,,100.00,\n\
             deposit,1,,50.00,\n",
        );

        let results: Vec<_> = CommandReader::new(file.path()).unwrap().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.starts_with("Line 3:"));
        assert!(err.contains("Invalid command type"));
        // A bad row does not stop iteration.
        assert!(results[2].is_ok());
    }

    #[test]
    fn non_numeric_account_yields_parse_error() {
        let file = create_temp_csv(
            "type,account,to,amount,description\n\
             deposit,abc,,100.00,\n",
        );

        let results: Vec<_> = CommandReader::new(file.path()).unwrap().collect();

        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().unwrap_err().contains("CSV parse error"));
    }
}
