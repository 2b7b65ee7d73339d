//! Output module for crawl summaries and ledger statistics
//!
//! This module handles:
//! - Per-flush summaries (new vs reused entities, events recorded)
//! - End-of-run totals
//! - Row counts read back from the durable store

pub mod stats;
mod summary;

pub use stats::{load_statistics, print_statistics, TableStatistics};
pub use summary::{describe_flush, log_flush, log_report, CrawlReport};
