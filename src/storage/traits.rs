//! Storage trait and error types
//!
//! A [`TableStore`] is an append-only home for the harvester's tables plus
//! the single crawl checkpoint value. Backends never update or delete rows.

use crate::model::{Table, TableRow};
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Any of these raised while flushing is run-fatal.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable table backends
pub trait TableStore {
    /// Loads every persisted row of `R`'s table, in insertion order
    ///
    /// A table that does not exist yet loads as empty.
    fn load<R: TableRow>(&self) -> StorageResult<Vec<R>>;

    /// Appends rows to `R`'s table
    fn append<R: TableRow>(&mut self, rows: &[R]) -> StorageResult<()>;

    /// Reads the address of the last fully processed listing row
    fn read_checkpoint(&self) -> StorageResult<Option<String>>;

    /// Replaces the crawl checkpoint
    fn write_checkpoint(&mut self, address: &str) -> StorageResult<()>;

    /// Counts the rows of a table
    fn count(&self, table: Table) -> StorageResult<u64>;
}
