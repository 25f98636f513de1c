//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over wallet operations from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize CSV rows
//! sequentially, converting each to a typed [`Operation`]. It maintains
//! streaming behavior by processing rows one at a time without loading the
//! entire file into memory.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row parsing errors are yielded as Err variants in the
//!   iterator, with line numbers for debugging, and do not end iteration

use crate::io::csv_format::{convert_csv_record, CsvRecord, Operation};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over wallet operations.
/// Maintains streaming behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// Opens the CSV file and prepares it for streaming iteration. The CSV
    /// reader is configured to trim whitespace, allow flexible field counts
    /// (most operations leave trailing columns empty) and use an 8KB
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns an error message if the file could not be opened.
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

impl Iterator for SyncReader {
    type Item = Result<Operation, String>;

    /// Get the next operation from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Operation))` - Successfully parsed operation
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();

        match deserializer.next()? {
            Ok(csv_record) => {
                self.line_num += 1;
                // Add line number context to any conversion errors
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

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const HEADER: &str = "op,user,currency,counterparty,to_currency,amount\n";

    #[test]
    fn test_sync_reader_new_opens_file() {
        let file = create_temp_csv(&format!("{}register,alice@example.com,,,,\n", HEADER));

        let result = SyncReader::new(file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_reader_iterates_operations() {
        let content = format!(
            "{}register,alice@example.com,,,,\n\
             rate,,USD,,,1.0\n\
             topup,alice@example.com,USD,,,100.00\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<_> = reader.collect();

        assert_eq!(operations.len(), 3);
        assert_eq!(
            operations[0].as_ref().unwrap(),
            &Operation::Register {
                email: "alice@example.com".to_string()
            }
        );
        assert_eq!(
            operations[1].as_ref().unwrap(),
            &Operation::Rate {
                code: "USD".to_string(),
                rate: Decimal::new(10, 1)
            }
        );
        assert_eq!(
            operations[2].as_ref().unwrap(),
            &Operation::TopUp {
                email: "alice@example.com".to_string(),
                currency: "USD".to_string(),
                amount: Decimal::new(10000, 2)
            }
        );
    }

    #[test]
    fn test_sync_reader_parses_transfer_row() {
        let content = format!(
            "{}transfer,alice@example.com,USD,bob@example.com,INR,10.00\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(
            operations,
            vec![Operation::Transfer {
                sender_email: "alice@example.com".to_string(),
                from_currency: "USD".to_string(),
                receiver_email: "bob@example.com".to_string(),
                to_currency: "INR".to_string(),
                amount: Decimal::new(1000, 2),
            }]
        );
    }

    #[test]
    fn test_sync_reader_includes_line_numbers_in_errors() {
        let content = format!(
            "{}register,alice@example.com,,,,\n\
             topup,alice@example.com,USD,,,ten\n\
             rate,,USD,,,1.0\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<_> = reader.collect();

        assert_eq!(operations.len(), 3);
        assert!(operations[0].is_ok());
        assert!(operations[1].is_err());
        assert!(operations[2].is_ok());

        let error = operations[1].as_ref().unwrap_err();
        assert!(error.contains("Line 3")); // Line 3 because of header
        assert!(error.contains("Invalid amount"));
    }

    #[test]
    fn test_sync_reader_continues_after_unknown_op() {
        let content = format!(
            "{}register,alice@example.com,,,,\n\
             frobnicate,alice@example.com,,,,\n\
             register,bob@example.com,,,,\n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<_> = reader.collect();

        assert_eq!(operations.len(), 3);
        assert!(operations[0].is_ok());
        assert!(operations[1].is_err());
        assert!(operations[2].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let content = format!(
            "{}  topup  ,  alice@example.com  ,  USD  ,,,  100.00  \n",
            HEADER
        );
        let file = create_temp_csv(&content);

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(
            operations,
            vec![Operation::TopUp {
                email: "alice@example.com".to_string(),
                currency: "USD".to_string(),
                amount: Decimal::new(10000, 2)
            }]
        );
    }

    #[test]
    fn test_sync_reader_handles_empty_file_after_header() {
        let file = create_temp_csv(HEADER);

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<_> = reader.collect();

        assert_eq!(operations.len(), 0);
    }

    #[test]
    fn test_sync_reader_handles_short_rows() {
        // register rows often omit every trailing column
        let content = format!("{}register,alice@example.com\n", HEADER);
        let file = create_temp_csv(&content);

        let reader = SyncReader::new(file.path()).unwrap();
        let operations: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(
            operations,
            vec![Operation::Register {
                email: "alice@example.com".to_string()
            }]
        );
    }
}
