//! realtrack-ingest main entry point
//!
//! This is the command-line interface for the RealTrack incremental ingest.

use anyhow::Context;
use clap::Parser;
use realtrack_ingest::config::{load_config_with_hash, Config};
use realtrack_ingest::crawler::run_ingest;
use realtrack_ingest::output::{load_statistics, print_run_summary, print_statistics};
use realtrack_ingest::session::HttpSession;
use realtrack_ingest::storage::reset_data;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// realtrack-ingest: incremental harvester for RealTrack transactions
///
/// Walks the search results newest-first, stores the detail page and assets
/// of every transaction not yet ingested, and stops at the first known one.
#[derive(Parser, Debug)]
#[command(name = "realtrack-ingest")]
#[command(version)]
#[command(about = "Incremental RealTrack transaction ingest", long_about = None)]
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

    /// Maximum number of results pages to walk (overrides config and environment)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Validate config and show what would be searched without contacting the site
    #[arg(long, conflicts_with_all = ["stats", "reset"])]
    dry_run: bool,

    /// Show statistics about the ledger and stored files and exit
    #[arg(long, conflicts_with_all = ["dry_run", "reset"])]
    stats: bool,

    /// Delete all raw content, assets, the ledger and the saved session, then exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    dotenvy::dotenv().ok();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.reset {
        handle_reset(&config)?;
    } else {
        handle_ingest(&config, cli.verbose > 0).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("realtrack_ingest=info,warn"),
            1 => EnvFilter::new("realtrack_ingest=debug,info"),
            2 => EnvFilter::new("realtrack_ingest=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== realtrack-ingest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  User agent: {}", config.site.user_agent);
    match config.credentials() {
        Ok(credentials) => println!("  Username: {}", credentials.username),
        Err(_) => println!("  Credentials: missing"),
    }

    println!("\nCrawl:");
    println!("  Max pages: {}", config.crawl.max_pages);
    println!("  Download attempts: {}", config.crawl.download_attempts);
    println!("  Retry delay: {}ms", config.crawl.retry_delay_ms);

    let search = &config.search;
    println!("\nSearch:");
    println!("  Property type: {}", search.property_type);
    println!("  Per page: {}", search.per_page);
    println!(
        "  Sort: {} {}",
        search.sort_primary, search.sort_primary_order
    );
    if let Some(secondary) = &search.sort_secondary {
        println!("  Then by: {} {}", secondary, search.sort_secondary_order);
    }
    println!(
        "  Range: {} {} to {} {}",
        search.start_month,
        search.start_year,
        search.end_month,
        search.resolved_end_year()
    );

    println!("\nStorage:");
    println!("  Raw content: {}", config.storage.content_dir);
    println!("  Assets: {}", config.storage.asset_dir);
    println!("  Ledger: {}", config.storage.ledger_path);
    println!("  Session state: {}", config.storage.session_state_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the stored state
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Ledger: {}\n", config.storage.ledger_path);

    let stats = load_statistics(&config.storage).context("Failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --reset mode: deletes all ingested data
fn handle_reset(config: &Config) -> anyhow::Result<()> {
    tracing::warn!("Resetting ingest data");
    reset_data(&config.storage).context("Failed to reset ingest data")?;
    println!("✓ Removed raw content, assets, ledger and saved session");
    Ok(())
}

/// Handles the main ingest operation
async fn handle_ingest(config: &Config, list_ids: bool) -> anyhow::Result<()> {
    let credentials = config.credentials()?;
    let session = HttpSession::from_config(config, credentials)?;

    tracing::info!(
        "Starting ingest against {} (up to {} pages)",
        config.site.base_url,
        config.crawl.max_pages
    );

    match run_ingest(config, session).await {
        Ok(outcome) => {
            print_run_summary(&outcome, list_ids);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Ingest failed: {}", e);
            Err(e.into())
        }
    }
}
