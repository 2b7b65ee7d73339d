//! Configuration module for Match-Ledger
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use match_ledger::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Harvesting edition {}", config.crawler.edition_id);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, RetryConfig, StorageBackend, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
