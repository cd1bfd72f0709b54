//! Service layer for the capture-classify-persist pipeline.
//!
//! These functions sit between the HTTP handlers / capture session and the
//! repository. Submission is the only compound operation: it validates the
//! inputs, runs the classifier synchronously, then performs a single insert.
//! A failure at any step leaves no partial record in the store.

use log::{debug, info};

use crate::api::{AnalysisRecord, Coordinate, NewAnalysis, OwnerId, RecordId};
use crate::classifier;
use crate::db::repository::{AnalysisRepository, RepositoryError, RepositoryResult};

/// One prospective analysis: a coordinate fix, an encoded image, free notes.
#[derive(Debug, Clone)]
pub struct Submission {
    pub coordinate: Coordinate,
    pub image_data: String,
    pub notes: Option<String>,
}

/// Errors from the submission pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Input rejected before any store call was made.
    #[error("invalid submission: {0}")]
    Validation(String),
    /// The store rejected or failed the insert; nothing was persisted.
    #[error("failed to persist analysis: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Classify a submission and persist the resulting record atomically.
///
/// Validation happens first and rejects the submission without touching the
/// store. Classification is pure and cannot fail, so the insert is the only
/// fallible step; if it fails the caller may retry with the same inputs.
pub async fn submit_analysis(
    repo: &dyn AnalysisRepository,
    owner: &OwnerId,
    submission: Submission,
) -> Result<AnalysisRecord, SubmitError> {
    submission
        .coordinate
        .validate()
        .map_err(SubmitError::Validation)?;
    if submission.image_data.is_empty() {
        return Err(SubmitError::Validation("image data is empty".to_string()));
    }

    let report = classifier::classify(&submission.coordinate);
    debug!(
        "classified ({:.4}, {:.4}) as {}",
        submission.coordinate.latitude, submission.coordinate.longitude, report.terrain
    );

    let record = repo
        .insert_analysis(NewAnalysis {
            owner_id: owner.clone(),
            coordinate: submission.coordinate,
            image_data: submission.image_data,
            report,
            notes: submission.notes.filter(|n| !n.is_empty()),
        })
        .await?;

    info!("stored analysis {} for owner {}", record.id, owner);
    Ok(record)
}

/// List the owner's analyses, newest first.
pub async fn list_analyses(
    repo: &dyn AnalysisRepository,
    owner: &OwnerId,
) -> RepositoryResult<Vec<AnalysisRecord>> {
    repo.list_by_owner(owner).await
}

/// Delete one of the owner's analyses.
pub async fn delete_analysis(
    repo: &dyn AnalysisRepository,
    owner: &OwnerId,
    id: &RecordId,
) -> RepositoryResult<()> {
    repo.delete_by_id(owner, id).await?;
    info!("deleted analysis {} for owner {}", id, owner);
    Ok(())
}

/// Check that the store is reachable.
pub async fn health_check(repo: &dyn AnalysisRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}
