//! Deduplicating ingestor
//!
//! Takes the full record list from one crawl run and merges it into the
//! store. Each candidate is looked up by its source URL first; only unseen
//! records are inserted. A uniqueness violation slipping past the lookup
//! (a concurrent run inserted the same record in between) is treated as a
//! benign duplicate; any other storage failure aborts the ingestion.

use crate::crawler::CandidateRecord;
use crate::storage::{DatasetStore, NewDataset, StorageError, StorageResult};
use serde::Serialize;

/// Outcome of one ingestion pass
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    /// Total candidates handed to the ingestor
    pub total_found: u32,
    /// Count actually inserted
    pub newly_inserted: u32,
    /// Human-readable outcome description
    pub message: String,
}

/// Merges crawl results into the store, skipping known source URLs
///
/// Candidates are processed in crawl order, so when the input itself
/// contains duplicate source URLs the first occurrence wins.
pub async fn ingest_candidates<S>(
    store: &mut S,
    candidates: &[CandidateRecord],
) -> StorageResult<IngestSummary>
where
    S: DatasetStore + Send + ?Sized,
{
    if candidates.is_empty() {
        return Ok(IngestSummary {
            total_found: 0,
            newly_inserted: 0,
            message: "Scrape produced no records; nothing to ingest".to_string(),
        });
    }

    let mut newly_inserted = 0u32;

    for candidate in candidates {
        let source_url = candidate.source_url.as_str();

        if store.find_by_source_url(source_url).await?.is_some() {
            tracing::debug!("Dataset already exists, skipping: {}", candidate.title);
            continue;
        }

        let insert = store
            .insert_dataset(NewDataset {
                title: candidate.title.clone(),
                description: candidate.description.clone(),
                source_url: source_url.to_string(),
            })
            .await;

        match insert {
            Ok(_) => newly_inserted += 1,
            // Lost a miss-and-insert race with a concurrent run
            Err(StorageError::ConstraintViolation(url)) => {
                tracing::debug!("Concurrent insert won for {}, skipping", url);
            }
            Err(e) => return Err(e),
        }
    }

    let total_found = candidates.len() as u32;
    let message = if newly_inserted == 0 {
        format!(
            "No new datasets; all {} scraped records already stored",
            total_found
        )
    } else {
        format!(
            "Ingested {} new datasets out of {} scraped records",
            newly_inserted, total_found
        )
    };

    Ok(IngestSummary {
        total_found,
        newly_inserted,
        message,
    })
}
