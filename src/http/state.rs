//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::db::repository::AnalysisRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for record storage
    pub repository: Arc<dyn AnalysisRepository>,
    /// Identity collaborator for bearer token exchange
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        repository: Arc<dyn AnalysisRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            repository,
            identity,
        }
    }
}
