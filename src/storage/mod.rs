//! Durable storage for the harvested tables
//!
//! This module handles persistence, including:
//! - The [`TableStore`] backends (CSV directory or SQLite file)
//! - Schema creation for the SQLite backend
//! - The [`Ledger`]: dedup-key sets, event IDs and the crawl checkpoint

mod csv_store;
mod ledger;
mod schema;
mod sqlite;
mod traits;

pub use csv_store::CsvStore;
pub use ledger::{FlushReport, Ledger, Snapshot};
pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, TableStore};
