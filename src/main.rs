//! Match-Ledger main entry point
//!
//! This is the command-line interface for the Match-Ledger harvester.

use clap::Parser;
use match_ledger::config::{load_config, Config, StorageBackend};
use match_ledger::crawler::run_crawl;
use match_ledger::output::{load_statistics, print_statistics};
use match_ledger::storage::{CsvStore, SqliteStore, TableStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Match-Ledger: a resumable harvester for historical match records
///
/// Match-Ledger walks a paginated match listing, resolves every club,
/// stadium, player, coach and referee into a stable ID and appends the
/// results to relational tables without duplicating rows.
#[derive(Parser, Debug)]
#[command(name = "match-ledger")]
#[command(version)]
#[command(about = "A resumable harvester for historical match records", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore the stored checkpoint and walk the whole listing again
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show row counts per table and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("match_ledger=info,warn"),
            1 => EnvFilter::new("match_ledger=debug,info"),
            2 => EnvFilter::new("match_ledger=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Match-Ledger Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Listing: {}", config.crawler.listing_url);
    println!("  Edition ID: {}", config.crawler.edition_id);
    println!("  Courtesy delay: {}ms", config.crawler.courtesy_delay_ms);
    println!("  Max listing pages: {}", config.crawler.max_listing_pages);

    println!("\nRetry Policy:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Backoff base: {}ms (linear)", config.retry.backoff_base_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    match config.output.backend {
        StorageBackend::Csv => println!("  CSV tables in: {}", config.output.directory),
        StorageBackend::Sqlite => println!("  SQLite database: {}", config.output.database_path),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", config.crawler.listing_url);

    Ok(())
}

/// Handles the --stats mode: shows row counts from the durable store
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match config.output.backend {
        StorageBackend::Csv => {
            println!("Tables: {}\n", config.output.directory);
            show_stats(CsvStore::new(Path::new(&config.output.directory))?)
        }
        StorageBackend::Sqlite => {
            println!("Database: {}\n", config.output.database_path);
            show_stats(SqliteStore::new(Path::new(&config.output.database_path))?)
        }
    }
}

fn show_stats<S: TableStore>(store: S) -> Result<(), Box<dyn std::error::Error>> {
    let stats = load_statistics(&store)?;
    print_statistics(&stats, store.read_checkpoint()?.as_deref());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling edition {} from {}",
        config.crawler.edition_id,
        config.crawler.listing_url
    );

    // Run the crawler
    match run_crawl(config, fresh).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} matches recorded",
                report.recorded
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
