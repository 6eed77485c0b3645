//! Storage trait and error types

use crate::storage::{DatasetRecord, NewDataset, RunRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Dataset already exists for source URL: {0}")]
    ConstraintViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for dataset storage backends
///
/// Operations are uniformly suspendable so callers in the crawl pipeline
/// never branch on the concrete store type. Implementations must enforce
/// uniqueness of `source_url` and report a duplicate insert as
/// [`StorageError::ConstraintViolation`].
#[async_trait]
pub trait DatasetStore {
    /// Looks up a dataset by its source URL (the dedup key)
    async fn find_by_source_url(&self, source_url: &str) -> StorageResult<Option<DatasetRecord>>;

    /// Inserts a new dataset
    ///
    /// Fails with [`StorageError::ConstraintViolation`] if a row with the
    /// same `source_url` already exists.
    async fn insert_dataset(&mut self, dataset: NewDataset) -> StorageResult<DatasetRecord>;

    /// Lists datasets in insertion order with offset/limit pagination
    async fn list_datasets(&self, skip: u32, limit: u32) -> StorageResult<Vec<DatasetRecord>>;

    /// Counts all stored datasets
    async fn count_datasets(&self) -> StorageResult<u64>;

    /// Appends a row to the ingest run ledger
    async fn record_run(
        &mut self,
        started_at: &str,
        config_hash: &str,
        pages_scraped: u32,
        total_found: u32,
        newly_inserted: u32,
        termination: &str,
    ) -> StorageResult<i64>;

    /// Returns the most recent ingest runs, newest first
    async fn latest_runs(&self, limit: u32) -> StorageResult<Vec<RunRecord>>;
}
