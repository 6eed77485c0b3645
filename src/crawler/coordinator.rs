//! Crawl coordination
//!
//! Drives the page-by-page loop (fetch, extract, resolve next link), bounds
//! the number of pages fetched, inserts a courtesy delay between requests,
//! and hands the accumulated records to the deduplicating ingestor.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::{parse_catalog_page, CandidateRecord};
use crate::ingest::ingest_candidates;
use crate::storage::{DatasetStore, SqliteStore};
use crate::ScavaError;
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Why a crawl run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// Pagination ended normally
    Completed,
    /// The page bound was hit before pagination ended
    BoundReached,
    /// A page failed to fetch; results up to that page were kept
    #[serde(rename = "aborted-on-fetch-error")]
    FetchFailed,
}

impl Termination {
    /// Stable string form used in the run ledger
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Completed => "completed",
            Termination::BoundReached => "bound-reached",
            Termination::FetchFailed => "aborted-on-fetch-error",
        }
    }
}

/// Result of the crawl loop, before ingestion
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Extracted records in crawl order
    pub records: Vec<CandidateRecord>,
    /// Number of pages actually fetched
    pub pages_scraped: u32,
    /// Why the loop stopped
    pub termination: Termination,
}

/// Final report of one crawl-and-ingest invocation
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub total_found: u32,
    pub newly_inserted: u32,
    pub pages_scraped: u32,
    pub termination: Termination,
    pub message: String,
}

/// Drives one scrape-and-ingest run against a dataset store
///
/// The coordinator depends only on the [`DatasetStore`] trait; the concrete
/// store is chosen at wiring time.
pub struct Coordinator<S> {
    config: Config,
    config_hash: String,
    store: S,
    client: Client,
}

impl<S: DatasetStore + Send> Coordinator<S> {
    /// Creates a coordinator around an already-opened store
    pub fn new(config: Config, config_hash: String, store: S) -> Result<Self, ScavaError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.scraper.request_timeout_secs),
        )?;

        Ok(Self {
            config,
            config_hash,
            store,
            client,
        })
    }

    /// Gives back the store once the coordinator is done
    pub fn into_store(self) -> S {
        self.store
    }

    /// Walks the catalog from the configured start page
    ///
    /// The loop is strictly sequential because each page's URL comes from
    /// the previous page's body. A fetch failure ends the run with whatever
    /// was accumulated so far; it is not retried.
    pub async fn crawl_catalog(&self) -> Result<CrawlOutcome, ScavaError> {
        let mut current = Url::parse(&self.config.scraper.start_url)?;
        let delay = Duration::from_millis(self.config.scraper.courtesy_delay_ms);
        let max_pages = self.config.scraper.max_pages;

        let mut records: Vec<CandidateRecord> = Vec::new();
        let mut pages_scraped = 0u32;

        let termination = loop {
            tracing::debug!("Fetching catalog page: {}", current);

            let body = match fetch_page(&self.client, &current).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Fetch failed, keeping partial results: {}", e);
                    break Termination::FetchFailed;
                }
            };

            let parsed = parse_catalog_page(&body, &current);
            pages_scraped += 1;
            tracing::info!(
                "Page {} yielded {} records ({} total)",
                pages_scraped,
                parsed.records.len(),
                records.len() + parsed.records.len()
            );
            records.extend(parsed.records);

            let href = match parsed.next_href {
                Some(href) => href,
                None => break Termination::Completed,
            };

            if pages_scraped >= max_pages {
                tracing::info!("Page bound of {} reached, stopping", max_pages);
                break Termination::BoundReached;
            }

            // Next links are relative to the page they appear on
            current = match current.join(&href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Unresolvable next link '{}': {}", href, e);
                    break Termination::Completed;
                }
            };

            tokio::time::sleep(delay).await;
        };

        Ok(CrawlOutcome {
            records,
            pages_scraped,
            termination,
        })
    }

    /// Runs the full pipeline: crawl, ingest, record the run
    pub async fn run(&mut self) -> Result<IngestReport, ScavaError> {
        let started_at = chrono::Utc::now().to_rfc3339();
        tracing::info!("Starting ingestion crawl at {}", self.config.scraper.start_url);

        let outcome = self.crawl_catalog().await?;
        let summary = ingest_candidates(&mut self.store, &outcome.records).await?;

        self.store
            .record_run(
                &started_at,
                &self.config_hash,
                outcome.pages_scraped,
                summary.total_found,
                summary.newly_inserted,
                outcome.termination.as_str(),
            )
            .await?;

        tracing::info!(
            "Run finished ({}): {} found, {} inserted over {} pages",
            outcome.termination.as_str(),
            summary.total_found,
            summary.newly_inserted,
            outcome.pages_scraped
        );

        Ok(IngestReport {
            total_found: summary.total_found,
            newly_inserted: summary.newly_inserted,
            pages_scraped: outcome.pages_scraped,
            termination: outcome.termination,
            message: summary.message,
        })
    }
}

/// Runs one ingestion crawl against the SQLite store named in the config
pub async fn run_ingestion(config: Config, config_hash: String) -> Result<IngestReport, ScavaError> {
    let store = SqliteStore::open(Path::new(&config.output.database_path))?;
    let mut coordinator = Coordinator::new(config, config_hash, store)?;
    coordinator.run().await
}
