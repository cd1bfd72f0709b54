//! History browser: the read path over the record store.
//!
//! Driven by explicit refresh signals (after every successful submission and
//! deletion). Each refresh reloads the owner's full list and replaces the
//! prior view wholesale; there is no incremental diffing or pagination.

use std::sync::Arc;

use log::warn;

use crate::api::{AnalysisRecord, RecordId};
use crate::auth::SessionContext;
use crate::db::repository::{AnalysisRepository, RepositoryError, RepositoryResult};
use crate::db::services;

/// Explicit user confirmation for destructive actions.
///
/// Deletion never proceeds on a default value; the caller must pass
/// `Confirmed` after asking the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record was deleted and removed from the local view.
    Deleted,
    /// The user cancelled; nothing was called or changed.
    Cancelled,
}

/// Read-only view of one owner's analysis history.
pub struct HistoryBrowser {
    context: SessionContext,
    repository: Arc<dyn AnalysisRepository>,
    records: Vec<AnalysisRecord>,
    selected: Option<RecordId>,
}

impl HistoryBrowser {
    pub fn new(context: SessionContext, repository: Arc<dyn AnalysisRepository>) -> Self {
        Self {
            context,
            repository,
            records: Vec::new(),
            selected: None,
        }
    }

    /// Reload the full list for the owner, replacing the prior view.
    ///
    /// A previously selected record that no longer exists is deselected.
    pub async fn refresh(&mut self) -> RepositoryResult<()> {
        let records =
            services::list_analyses(self.repository.as_ref(), self.context.owner_id()).await?;
        self.records = records;

        if let Some(ref id) = self.selected {
            if !self.records.iter().any(|r| &r.id == id) {
                self.selected = None;
            }
        }
        Ok(())
    }

    /// Records in the current view, newest first.
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    /// Select a past record, surfacing its report, image and coordinate.
    pub fn select(&mut self, id: &RecordId) -> Option<&AnalysisRecord> {
        let record = self.records.iter().find(|r| &r.id == id)?;
        self.selected = Some(id.clone());
        Some(record)
    }

    /// The currently selected record, if any.
    pub fn selected(&self) -> Option<&AnalysisRecord> {
        let id = self.selected.as_ref()?;
        self.records.iter().find(|r| &r.id == id)
    }

    /// Delete a record after explicit confirmation.
    ///
    /// On success the id is removed from the local view without a full
    /// reload. On failure the error is returned and the view is left
    /// unchanged; the caller decides whether to surface a retry.
    pub async fn delete(
        &mut self,
        id: &RecordId,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, RepositoryError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(DeleteOutcome::Cancelled);
        }

        match services::delete_analysis(self.repository.as_ref(), self.context.owner_id(), id)
            .await
        {
            Ok(()) => {
                self.records.retain(|r| &r.id != id);
                if self.selected.as_ref() == Some(id) {
                    self.selected = None;
                }
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                warn!("delete of {} failed: {}", id, err);
                Err(err)
            }
        }
    }
}
