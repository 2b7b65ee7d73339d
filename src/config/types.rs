use serde::Deserialize;

/// Main configuration structure for Match-Ledger
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawl source and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First page of the paginated match listing
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Competition edition stamped on every match row
    #[serde(rename = "edition-id")]
    pub edition_id: u32,

    /// Fixed pause before every request (milliseconds)
    #[serde(rename = "courtesy-delay-ms", default = "default_courtesy_delay_ms")]
    pub courtesy_delay_ms: u64,

    /// Upper bound on listing pages followed through pagination
    #[serde(rename = "max-listing-pages", default = "default_max_listing_pages")]
    pub max_listing_pages: u32,
}

/// Bounded retry with linear backoff
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per document, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; attempt `n` waits `n * backoff-base-ms` before retrying
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Which table backend receives the harvested rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Csv,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding one CSV file per table plus the checkpoint
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

fn default_courtesy_delay_ms() -> u64 {
    1000
}

fn default_max_listing_pages() -> u32 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    2000
}

fn default_directory() -> String {
    "data".to_string()
}

fn default_database_path() -> String {
    "data/ledger.db".to_string()
}
