//! Flush and run summaries
//!
//! Reported after each flush and at the end of a crawl.

use crate::resolve::ResolutionStats;
use crate::storage::FlushReport;
use crate::Table;

/// Totals for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Listing pages walked
    pub pages: u32,

    /// Listing rows seen, skipped ones included
    pub rows_seen: u64,

    /// Rows that produced a match
    pub recorded: u64,

    /// Rows skipped for an ambiguous score or an unresolved club
    pub skipped: u64,

    /// Rows passed over because they precede the checkpoint
    pub resumed_past: u64,

    /// Event rows written
    pub events: u64,

    /// Rows written across all tables
    pub rows_written: u64,
}

impl CrawlReport {
    /// Folds one flush into the run totals
    pub fn absorb(&mut self, flush: &FlushReport) {
        self.events += flush.written(Table::Event) as u64;
        self.rows_written += flush.total_written() as u64;
    }
}

/// One-line description of a flush: new vs reused entities and events
pub fn describe_flush(report: &FlushReport, stats: &ResolutionStats) -> String {
    let mut parts: Vec<String> = stats
        .iter()
        .map(|(kind, counts)| {
            let mut part = format!("{} {} new/{} reused", kind, counts.created, counts.reused);
            if counts.failed > 0 {
                part.push_str(&format!("/{} failed", counts.failed));
            }
            part
        })
        .collect();

    parts.push(format!("{} events", report.written(Table::Event)));

    let dropped: usize = report.dropped.values().sum();
    format!(
        "Flushed {} rows ({} duplicates dropped): {}",
        report.total_written(),
        dropped,
        parts.join(", ")
    )
}

/// Logs a flush summary at info level
pub fn log_flush(report: &FlushReport, stats: &ResolutionStats) {
    tracing::info!("{}", describe_flush(report, stats));
}

/// Logs the end-of-run totals
pub fn log_report(report: &CrawlReport) {
    tracing::info!(
        "Crawl finished: {} listing pages, {} rows ({} recorded, {} skipped, {} already done), {} rows written, {} events",
        report.pages,
        report.rows_seen,
        report.recorded,
        report.skipped,
        report.resumed_past,
        report.rows_written,
        report.events
    );
}
