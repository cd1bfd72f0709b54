//! Repository trait for analysis record storage.
//!
//! The trait abstracts the durable store so different backends (in-memory,
//! Postgres) can be swapped without touching the service layer or the HTTP
//! handlers.

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::api::{AnalysisRecord, NewAnalysis, OwnerId, RecordId};

/// Repository for analysis records.
///
/// Records are append-only per owner: insert, list and delete are the only
/// operations, there is no update. Every operation is scoped by owner so an
/// implementation must never return or remove another owner's records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust. Concurrent
/// inserts from different sessions for the same owner must not corrupt the
/// store; each insert is independent.
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Persist a new analysis record atomically.
    ///
    /// The repository assigns the record id and the `created_at`/`updated_at`
    /// timestamps. On failure nothing is persisted.
    ///
    /// # Returns
    /// * `Ok(AnalysisRecord)` - The stored record including assigned fields
    /// * `Err(RepositoryError)` - If the store is unreachable or rejects the write
    async fn insert_analysis(&self, new: NewAnalysis) -> RepositoryResult<AnalysisRecord>;

    /// List all records belonging to an owner, newest first.
    ///
    /// Ordering is by `created_at` descending. An owner with no records gets
    /// an empty vec, not an error. Two calls with no intervening writes
    /// return identical sequences.
    async fn list_by_owner(&self, owner: &OwnerId) -> RepositoryResult<Vec<AnalysisRecord>>;

    /// Delete a record if and only if it belongs to the given owner.
    ///
    /// Returns `RepositoryError::NotFound` both when no such record exists
    /// and when it exists under a different owner, so callers cannot probe
    /// for other owners' records.
    async fn delete_by_id(&self, owner: &OwnerId, id: &RecordId) -> RepositoryResult<()>;

    /// Check that the underlying store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
