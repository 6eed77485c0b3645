//! Scava: a paginated catalog harvester
//!
//! This crate crawls a multi-page catalog site, extracts structured dataset
//! records from each listing page, and inserts them into a SQLite store,
//! skipping records whose source URL is already present.

pub mod config;
pub mod crawler;
pub mod ingest;
pub mod storage;

use thiserror::Error;

/// Main error type for scava operations
#[derive(Debug, Error)]
pub enum ScavaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error for {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for scava operations
pub type Result<T> = std::result::Result<T, ScavaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CandidateRecord, Coordinator, CrawlOutcome, IngestReport, Termination};
pub use ingest::IngestSummary;
pub use storage::{DatasetRecord, DatasetStore, NewDataset, SqliteStore};
