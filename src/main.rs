//! Scava main entry point
//!
//! Command-line interface for the scava catalog harvester.

use anyhow::Context;
use clap::Parser;
use scava::config::load_config_with_hash;
use scava::crawler::run_ingestion;
use scava::storage::{DatasetStore, SqliteStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Scava: a paginated catalog harvester
///
/// Scava walks a multi-page catalog site, extracts dataset records from each
/// listing page, and inserts the ones whose source URL is not yet stored.
#[derive(Parser, Debug)]
#[command(name = "scava")]
#[command(version)]
#[command(about = "Harvest catalog records into a deduplicated dataset store", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "list"])]
    dry_run: bool,

    /// Show dataset count and recent ingest runs, then exit
    #[arg(long, conflicts_with_all = ["dry_run", "list"])]
    stats: bool,

    /// List stored datasets as JSON, then exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    list: bool,

    /// Number of datasets to skip when listing
    #[arg(long, default_value_t = 0, requires = "list")]
    skip: u32,

    /// Maximum number of datasets to list
    #[arg(long, default_value_t = 100, requires = "list")]
    limit: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config).await?;
    } else if cli.list {
        handle_list(&config, cli.skip, cli.limit).await?;
    } else {
        handle_run(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scava=info,warn"),
            1 => EnvFilter::new("scava=debug,info"),
            2 => EnvFilter::new("scava=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &scava::Config) {
    println!("=== Scava Dry Run ===\n");

    println!("Scraper:");
    println!("  Start URL: {}", config.scraper.start_url);
    println!("  Page bound: {}", config.scraper.max_pages);
    println!("  Courtesy delay: {}ms", config.scraper.courtesy_delay_ms);
    println!(
        "  Request timeout: {}s",
        config.scraper.request_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: dataset count and recent run ledger
async fn handle_stats(config: &scava::Config) -> anyhow::Result<()> {
    let store = SqliteStore::open(Path::new(&config.output.database_path))?;

    let count = store.count_datasets().await?;
    println!("Database: {}", config.output.database_path);
    println!("Stored datasets: {}\n", count);

    let runs = store.latest_runs(10).await?;
    if runs.is_empty() {
        println!("No ingest runs recorded yet");
    } else {
        println!("Recent ingest runs:");
        for run in runs {
            println!(
                "  #{} {} — {} pages, {} found, {} inserted ({})",
                run.id,
                run.started_at,
                run.pages_scraped,
                run.total_found,
                run.newly_inserted,
                run.termination
            );
        }
    }

    Ok(())
}

/// Handles the --list mode: paginated dataset listing as JSON
async fn handle_list(config: &scava::Config, skip: u32, limit: u32) -> anyhow::Result<()> {
    let store = SqliteStore::open(Path::new(&config.output.database_path))?;
    let datasets = store.list_datasets(skip, limit).await?;
    println!("{}", serde_json::to_string_pretty(&datasets)?);
    Ok(())
}

/// Handles the default mode: run the ingestion crawl and print the report
async fn handle_run(config: scava::Config, config_hash: String) -> anyhow::Result<()> {
    match run_ingestion(config, config_hash).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Ingestion crawl failed: {}", e);
            Err(e.into())
        }
    }
}
