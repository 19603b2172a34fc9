//! CSV ledger ingestion.
//!
//! The file must have a header row naming at least [`REQUIRED_COLUMNS`];
//! other columns are ignored. Rows are numbered as in a spreadsheet, so the
//! first data row is row 2.

use aegisgraph_core::error::{KernelError, Result};
use aegisgraph_graph::types::{parse_timestamp, Transaction};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns every ledger must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(default)]
    transaction_id: String,
    #[serde(default)]
    sender_id: String,
    #[serde(default)]
    receiver_id: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    timestamp: String,
}

impl LedgerRow {
    fn into_transaction(self, row: usize) -> Result<Transaction> {
        if self.transaction_id.is_empty() || self.sender_id.is_empty() || self.receiver_id.is_empty()
        {
            return Err(KernelError::validation(format!(
                "Invalid data at row {}: missing required fields",
                row
            )));
        }

        let amount = self.amount.parse::<f64>().map_err(|_| {
            KernelError::validation(format!(
                "Invalid data at row {}: unparseable amount {:?}",
                row, self.amount
            ))
        })?;
        let timestamp = parse_timestamp(&self.timestamp).map_err(|_| {
            KernelError::validation(format!(
                "Invalid data at row {}: unparseable timestamp {:?}",
                row, self.timestamp
            ))
        })?;

        Ok(Transaction::new(
            self.transaction_id,
            self.sender_id,
            self.receiver_id,
            amount,
            timestamp,
        ))
    }
}

fn csv_error(err: csv::Error) -> KernelError {
    KernelError::validation(format!("CSV parsing error: {}", err))
}

/// Read transactions from any CSV source.
pub fn read_transactions<R: Read>(source: R) -> Result<Vec<Transaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(KernelError::validation(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut transactions = Vec::new();
    for (index, row) in reader.deserialize::<LedgerRow>().enumerate() {
        let row = row.map_err(csv_error)?;
        transactions.push(row.into_transaction(index + 2)?);
    }

    tracing::debug!(transactions = transactions.len(), "Parsed ledger");
    Ok(transactions)
}

/// Parse transactions from CSV text.
pub fn parse_csv(data: &str) -> Result<Vec<Transaction>> {
    read_transactions(data.as_bytes())
}

/// Read transactions from a CSV file.
pub fn read_csv_file(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let file = File::open(path.as_ref())?;
    read_transactions(file)
}
