//! SQLite storage implementation

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DatasetStore, StorageError, StorageResult};
use crate::storage::{DatasetRecord, NewDataset, RunRecord};
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite storage backend
///
/// The connection lives behind a mutex so read operations can run from
/// shared references inside suspendable trait methods.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and initializes the schema
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Maps a rusqlite error to ConstraintViolation when the unique index on
/// source_url rejected the insert
fn classify_insert_error(e: rusqlite::Error, source_url: &str) -> StorageError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = e {
        if failure.code == ErrorCode::ConstraintViolation {
            return StorageError::ConstraintViolation(source_url.to_string());
        }
    }
    StorageError::Sqlite(e)
}

fn row_to_dataset(row: &rusqlite::Row<'_>) -> Result<DatasetRecord, rusqlite::Error> {
    Ok(DatasetRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        source_url: row.get(3)?,
    })
}

#[async_trait]
impl DatasetStore for SqliteStore {
    async fn find_by_source_url(&self, source_url: &str) -> StorageResult<Option<DatasetRecord>> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT id, title, description, source_url FROM datasets WHERE source_url = ?1",
                params![source_url],
                row_to_dataset,
            )
            .optional()?;
        Ok(record)
    }

    async fn insert_dataset(&mut self, dataset: NewDataset) -> StorageResult<DatasetRecord> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO datasets (title, description, source_url) VALUES (?1, ?2, ?3)",
            params![dataset.title, dataset.description, dataset.source_url],
        )
        .map_err(|e| classify_insert_error(e, &dataset.source_url))?;

        Ok(DatasetRecord {
            id: conn.last_insert_rowid(),
            title: dataset.title,
            description: dataset.description,
            source_url: dataset.source_url,
        })
    }

    async fn list_datasets(&self, skip: u32, limit: u32) -> StorageResult<Vec<DatasetRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, source_url FROM datasets
             ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![limit, skip], row_to_dataset)?;
        let mut datasets = Vec::new();
        for row in rows {
            datasets.push(row?);
        }
        Ok(datasets)
    }

    async fn count_datasets(&self) -> StorageResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM datasets", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    async fn record_run(
        &mut self,
        started_at: &str,
        config_hash: &str,
        pages_scraped: u32,
        total_found: u32,
        newly_inserted: u32,
        termination: &str,
    ) -> StorageResult<i64> {
        let finished_at = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO ingest_runs
             (started_at, finished_at, config_hash, pages_scraped, total_found, newly_inserted, termination)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                started_at,
                finished_at,
                config_hash,
                pages_scraped,
                total_found,
                newly_inserted,
                termination
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn latest_runs(&self, limit: u32) -> StorageResult<Vec<RunRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, pages_scraped, total_found,
             newly_inserted, termination
             FROM ingest_runs ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok(RunRecord {
                id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                config_hash: row.get(3)?,
                pages_scraped: row.get(4)?,
                total_found: row.get(5)?,
                newly_inserted: row.get(6)?,
                termination: row.get(7)?,
            })
        })?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?);
        }
        Ok(runs)
    }
}
