//! Storage module for persisting harvested datasets
//!
//! This module owns the SQLite database: the `datasets` table with its
//! uniqueness constraint on `source_url` (the dedup key), and the
//! `ingest_runs` ledger that records each crawl-and-ingest invocation.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{DatasetStore, StorageError, StorageResult};

use serde::Serialize;

/// A dataset row as stored in the database
#[derive(Debug, Clone, Serialize)]
pub struct DatasetRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub source_url: String,
}

/// Payload for inserting a new dataset
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub title: String,
    pub description: String,
    pub source_url: String,
}

/// One row of the ingest run ledger
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: String,
    pub config_hash: String,
    pub pages_scraped: u32,
    pub total_found: u32,
    pub newly_inserted: u32,
    pub termination: String,
}
