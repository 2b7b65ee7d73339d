//! Crawler module for listing traversal and match processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with courtesy delay and retry logic
//! - Per-row match processing
//! - Overall crawl coordination and checkpointing

mod coordinator;
mod fetcher;
mod processor;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, Document, Fetcher, RetryPolicy};
pub use processor::{MatchOutcome, MatchProcessor, SkipReason};
