//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over wallet operations from a CSV file.
//! Supports batch reading so the async strategy can overlap parsing with
//! application.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - the csv_format module for record conversion
//!
//! Invalid rows are logged and skipped; a batch always contains only
//! well-formed operations.

use crate::io::csv_format::{convert_csv_record, CsvRecord, Operation};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Provides batch reading interface over wallet operations.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of operations
    ///
    /// Reads up to `batch_size` rows from the CSV file, converting them to
    /// typed operations. Invalid rows are logged and skipped.
    ///
    /// Returns an empty vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Operation> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(operation) => batch.push(operation),
                    Err(e) => warn!("Record conversion error: {}", e),
                },
                Some(Err(e)) => warn!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }
}
