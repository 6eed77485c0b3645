//! Crawler module for catalog page fetching and processing
//!
//! This module contains the scraping pipeline:
//! - HTTP fetching of catalog pages
//! - Item and pagination extraction
//! - The page-by-page crawl loop and ingest coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_ingestion, Coordinator, CrawlOutcome, IngestReport, Termination};
pub use fetcher::{build_http_client, fetch_page};
pub use parser::{extract_items, next_page_href, parse_catalog_page, CandidateRecord, ParsedPage};
