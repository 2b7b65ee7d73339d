//! Crawl coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Opening the ledger and seeding the resolver from persisted rows
//! - Walking the paginated listing
//! - Skipping rows up to the checkpoint
//! - Processing each row, then flushing and advancing the checkpoint

use crate::config::{Config, StorageBackend};
use crate::crawler::{build_http_client, Fetcher, MatchOutcome, MatchProcessor, RetryPolicy};
use crate::extract::{parse_listing, ListingRow};
use crate::output::{log_flush, log_report, CrawlReport};
use crate::resolve::Resolver;
use crate::storage::{CsvStore, Ledger, SqliteStore, TableStore};
use crate::{ExtractionError, LedgerError};
use std::collections::HashSet;
use std::path::Path;

/// Where the walk stands relative to the stored checkpoint
enum Resume {
    /// No checkpoint, or `--fresh`: process every row
    Off,
    /// Skip rows until the one carrying this match link has passed
    Seeking(String),
    /// Checkpoint passed
    Done,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: TableStore> {
    config: Config,
    ledger: Ledger<S>,
    resolver: Resolver,
    fetcher: Fetcher,
    processor: MatchProcessor,
    resume: Resume,
}

impl<S: TableStore> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - The durable table backend
    /// * `fresh` - Whether to ignore the stored checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ledger opened and registries seeded
    /// * `Err(LedgerError)` - Failed to read the store or build the client
    pub fn new(config: Config, store: S, fresh: bool) -> Result<Self, LedgerError> {
        let (ledger, snapshot) = Ledger::open(store)?;
        let resolver = Resolver::from_snapshot(&snapshot);

        let resume = match ledger.checkpoint()? {
            Some(address) if !fresh => {
                tracing::info!("Resuming after checkpoint {}", address);
                Resume::Seeking(address)
            }
            Some(_) => {
                tracing::info!("Starting fresh crawl (ignoring checkpoint)");
                Resume::Off
            }
            None => {
                tracing::info!("No checkpoint found, starting from the first listing row");
                Resume::Off
            }
        };

        let client = build_http_client(&config.user_agent)?;
        let fetcher = Fetcher::new(client, RetryPolicy::from_config(&config.crawler, &config.retry));
        let processor = MatchProcessor::new(config.crawler.edition_id);

        Ok(Self {
            config,
            ledger,
            resolver,
            fetcher,
            processor,
            resume,
        })
    }

    /// Runs the main crawl loop
    ///
    /// This is the core crawling logic that:
    /// 1. Fetches a listing page and parses its rows
    /// 2. Skips rows already covered by the checkpoint
    /// 3. Processes each remaining row through the match processor
    /// 4. Flushes queued rows and advances the checkpoint
    /// 5. Follows the next-page link
    ///
    /// Only a listing fetch failure or a storage failure ends the run early.
    pub async fn run(&mut self) -> Result<CrawlReport, LedgerError> {
        let mut report = CrawlReport::default();
        let mut visited = HashSet::new();
        let mut next = Some(self.config.crawler.listing_url.clone());

        while let Some(address) = next.take() {
            if report.pages >= self.config.crawler.max_listing_pages {
                tracing::info!(
                    "Reached the limit of {} listing pages",
                    self.config.crawler.max_listing_pages
                );
                break;
            }
            if !visited.insert(address.clone()) {
                tracing::warn!("Listing page {} repeats; stopping", address);
                break;
            }

            let document = self
                .fetcher
                .retrieve(&address)
                .await
                .map_err(|source| LedgerError::Listing {
                    url: address.clone(),
                    source,
                })?;

            let page = match parse_listing(&document.body, &document.url) {
                Ok(page) => page,
                Err(ExtractionError::MissingSection(section)) => {
                    tracing::warn!("Listing page {} has no {}; stopping", address, section);
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            report.pages += 1;
            tracing::info!(
                "Listing page {} ({}): {} rows",
                report.pages,
                address,
                page.rows.len()
            );

            for row in &page.rows {
                report.rows_seen += 1;
                if self.already_done(row) {
                    report.resumed_past += 1;
                    continue;
                }
                self.process_row(row, &mut report).await?;
            }

            next = page.next_page;
        }

        if let Resume::Seeking(address) = &self.resume {
            tracing::warn!(
                "Checkpoint {} was never met in the listing; nothing was skipped past it. Use --fresh to re-walk",
                address
            );
        }

        log_report(&report);
        Ok(report)
    }

    /// Whether this row precedes or is the checkpointed row
    fn already_done(&mut self, row: &ListingRow) -> bool {
        let Resume::Seeking(checkpoint) = &self.resume else {
            return false;
        };

        if row.match_link.as_deref() == Some(checkpoint.as_str()) {
            tracing::info!("Reached checkpoint {}; resuming with the next row", checkpoint);
            self.resume = Resume::Done;
        }
        true
    }

    /// Processes one row and commits everything it produced
    async fn process_row(
        &mut self,
        row: &ListingRow,
        report: &mut CrawlReport,
    ) -> Result<(), LedgerError> {
        match self
            .processor
            .process(row, &mut self.fetcher, &mut self.resolver)
            .await
        {
            MatchOutcome::Recorded { .. } => report.recorded += 1,
            MatchOutcome::Skipped(_) => report.skipped += 1,
        }

        let pending = self.resolver.take_pending();
        let stats = self.resolver.take_stats();
        let flushed = self.ledger.flush(pending)?;
        if flushed.total_written() > 0 || !stats.is_empty() {
            log_flush(&flushed, &stats);
        }
        report.absorb(&flushed);

        if let Some(link) = &row.match_link {
            self.ledger.advance_checkpoint(link)?;
        }

        Ok(())
    }

    /// Fetch requests issued so far
    pub fn requests(&self) -> u64 {
        self.fetcher.requests()
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }
}

/// Runs a complete crawl against the configured backend
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Whether to ignore the stored checkpoint
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(LedgerError)` - Listing exhausted or storage failed
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlReport, LedgerError> {
    match config.output.backend {
        StorageBackend::Csv => {
            let store = CsvStore::new(Path::new(&config.output.directory))?;
            Coordinator::new(config, store, fresh)?.run().await
        }
        StorageBackend::Sqlite => {
            let store = SqliteStore::new(Path::new(&config.output.database_path))?;
            Coordinator::new(config, store, fresh)?.run().await
        }
    }
}
