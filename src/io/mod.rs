//! I/O handling for the batch driver
//!
//! - `csv_format` - CSV record shapes, command conversion, account output
//! - `reader` - Streaming command reader over an input file

pub mod csv_format;
pub mod reader;

pub use csv_format::{convert_csv_record, write_accounts_csv, Command, CsvRecord};
pub use reader::CommandReader;
