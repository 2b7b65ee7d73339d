//! Match-Ledger: a resumable harvester for historical match records
//!
//! This crate walks a paginated match listing, resolves every club, stadium,
//! player, coach and referee a match references into a stable surrogate ID,
//! parses per-player annotations into timed match events and appends the
//! result to a fixed set of relational tables without ever duplicating a row.

pub mod config;
pub mod crawler;
pub mod events;
pub mod extract;
pub mod model;
pub mod output;
pub mod resolve;
pub mod storage;

use thiserror::Error;

/// Main error type for Match-Ledger operations
///
/// Only configuration problems, durable-store failures and an exhausted
/// listing fetch reach this type. Entity-level failures are absorbed where
/// they happen and show up as missing references instead.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Listing page {url} could not be fetched: {source}")]
    Listing { url: String, source: FetchError },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Document retrieval errors
///
/// A `FetchError` only ever fails the single reference being resolved,
/// except for listing pages where it halts the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid address {url}: {message}")]
    InvalidAddress { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Errors raised while pulling structured data out of a document
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Section '{0}' not found in document")]
    MissingSection(&'static str),

    #[error("Invalid selector: {0}")]
    Selector(&'static str),
}

/// Text that matches no known grammar
///
/// The affected listing row or minute marker is skipped with a warning,
/// never coerced into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmbiguity {
    #[error("Unrecognised score text '{0}'")]
    Score(String),

    #[error("Unrecognised minute text '{0}'")]
    Minute(String),
}

/// Result type alias for Match-Ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use model::{EntityKind, Id, Table};
