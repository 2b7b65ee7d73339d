//! Document fetcher
//!
//! This module handles every HTTP request the harvester makes:
//! - Building the HTTP client with a polite user agent
//! - A fixed courtesy delay before each attempt
//! - Bounded retry with linear backoff on rate limits and transient failures

use crate::config::{CrawlerConfig, RetryConfig, UserAgentConfig};
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Retry and pacing rules shared by every fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub courtesy_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(crawler: &CrawlerConfig, retry: &RetryConfig) -> Self {
        Self {
            max_attempts: retry.max_attempts.max(1),
            backoff_base: Duration::from_millis(retry.backoff_base_ms),
            courtesy_delay: Duration::from_millis(crawler.courtesy_delay_ms),
        }
    }

    /// Wait after failed attempt `attempt` (1-based): `base * attempt`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }

    /// Rate limits and server errors are worth another attempt
    pub fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }
}

/// A retrieved document
#[derive(Debug, Clone)]
pub struct Document {
    /// Final address after redirects, used to resolve relative links
    pub url: Url,
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use match_ledger::config::UserAgentConfig;
/// use match_ledger::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "MatchLedger".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sequential document fetcher
///
/// Holds no document state between calls. Every attempt, including the
/// first, waits out the courtesy delay.
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    requests: u64,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            requests: 0,
        }
    }

    /// Retrieves a document
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the body |
    /// | 429, 5xx | Retry after `base * attempt` |
    /// | Transport error | Retry after `base * attempt` |
    /// | Other status | Fail immediately |
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The body and final address
    /// * `Err(FetchError)` - Bad address, non-retryable status, or retries exhausted
    pub async fn retrieve(&mut self, address: &str) -> Result<Document, FetchError> {
        let url = Url::parse(address).map_err(|e| FetchError::InvalidAddress {
            url: address.to_string(),
            message: e.to_string(),
        })?;

        let attempts = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            tokio::time::sleep(self.policy.courtesy_delay).await;
            self.requests += 1;
            tracing::trace!("GET {} (attempt {}/{})", url, attempt, attempts);

            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let final_url = response.url().clone();
                        match response.text().await {
                            Ok(body) => return Ok(Document { url: final_url, body }),
                            Err(e) => last_error = e.to_string(),
                        }
                    } else if RetryPolicy::is_retryable(status) {
                        last_error = format!("HTTP {}", status.as_u16());
                    } else {
                        return Err(FetchError::Status {
                            url: address.to_string(),
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) => last_error = e.to_string(),
            }

            if attempt < attempts {
                let wait = self.policy.backoff_for(attempt);
                tracing::warn!(
                    "Fetch of {} failed ({}); retrying in {:?}",
                    address,
                    last_error,
                    wait
                );
                tokio::time::sleep(wait).await;
            }
        }

        Err(FetchError::Exhausted {
            url: address.to_string(),
            attempts,
            last_error,
        })
    }

    /// Requests issued so far, retries included
    pub fn requests(&self) -> u64 {
        self.requests
    }
}
