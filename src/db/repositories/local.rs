//! In-memory repository implementation for unit testing and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::api::{AnalysisRecord, NewAnalysis, OwnerId, RecordId};
use crate::db::repository::{
    AnalysisRepository, ErrorContext, RepositoryError, RepositoryResult,
};

/// In-memory analysis record store.
///
/// Backed by a `HashMap` behind a `parking_lot::RwLock`. Read-after-write
/// consistent: a completed insert or delete is visible to every subsequent
/// list call from any task.
pub struct LocalRepository {
    records: RwLock<HashMap<RecordId, StoredRecord>>,
    // Monotonic insertion counter; breaks created_at ties so list ordering
    // is stable even when two inserts land on the same timestamp tick.
    sequence: AtomicU64,
}

struct StoredRecord {
    record: AnalysisRecord,
    seq: u64,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Number of stored records across all owners. Test helper.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisRepository for LocalRepository {
    async fn insert_analysis(&self, new: NewAnalysis) -> RepositoryResult<AnalysisRecord> {
        let now = Utc::now();
        let record = AnalysisRecord {
            id: RecordId::new(Uuid::new_v4().to_string()),
            owner_id: new.owner_id,
            coordinate: new.coordinate,
            image_data: new.image_data,
            report: new.report,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.records.write().insert(
            record.id.clone(),
            StoredRecord {
                record: record.clone(),
                seq,
            },
        );

        Ok(record)
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> RepositoryResult<Vec<AnalysisRecord>> {
        let records = self.records.read();
        let mut owned: Vec<(&u64, &AnalysisRecord)> = records
            .values()
            .filter(|stored| &stored.record.owner_id == owner)
            .map(|stored| (&stored.seq, &stored.record))
            .collect();

        // Newest first; insertion order as tiebreaker.
        owned.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(a.0))
        });

        Ok(owned.into_iter().map(|(_, r)| r.clone()).collect())
    }

    async fn delete_by_id(&self, owner: &OwnerId, id: &RecordId) -> RepositoryResult<()> {
        let mut records = self.records.write();
        match records.get(id) {
            Some(stored) if &stored.record.owner_id == owner => {
                records.remove(id);
                Ok(())
            }
            // Absent and not-owned collapse to the same error so a caller
            // cannot learn whether another owner holds this id.
            _ => Err(RepositoryError::not_found_with_context(
                format!("No analysis {} for this owner", id),
                ErrorContext::new("delete_by_id")
                    .with_entity("analysis")
                    .with_entity_id(id),
            )),
        }
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
