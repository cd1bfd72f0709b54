//! HTTP handlers for the REST API.
//!
//! Each handler verifies the bearer token, then delegates to the service
//! layer. No handler touches the store without a verified identity.

use axum::{
    extract::{Path, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    Json,
};

use super::dto::{
    AnalysisListResponse, AnalysisResponse, AnalyzeLandRequest, DeleteResponse, HealthResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::RecordId;
use crate::auth::{AuthError, Identity};
use crate::db::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Extract and verify the bearer token from the request headers.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header);
    let identity = state.identity.verify_token(token).await?;
    Ok(identity)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the record
/// store is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Analysis Pipeline
// =============================================================================

/// POST /analyze-land
///
/// Classify a coordinate/image submission and persist the resulting record
/// for the authenticated owner.
pub async fn analyze_land(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeLandRequest>,
) -> HandlerResult<AnalysisResponse> {
    let identity = authenticate(&state, &headers).await?;

    let record =
        services::submit_analysis(state.repository.as_ref(), &identity.id, request.into()).await?;

    Ok(Json(AnalysisResponse {
        success: true,
        data: record,
    }))
}

/// GET /analyses
///
/// List the authenticated owner's analyses, newest first.
pub async fn list_analyses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult<AnalysisListResponse> {
    let identity = authenticate(&state, &headers).await?;

    let records = services::list_analyses(state.repository.as_ref(), &identity.id).await?;

    Ok(Json(AnalysisListResponse {
        success: true,
        data: records,
    }))
}

/// DELETE /analyses/{id}
///
/// Delete one of the authenticated owner's analyses. Responds 404 both for
/// an unknown id and for a record owned by someone else.
pub async fn delete_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> HandlerResult<DeleteResponse> {
    let identity = authenticate(&state, &headers).await?;

    let id = RecordId::new(id);
    services::delete_analysis(state.repository.as_ref(), &identity.id, &id).await?;

    Ok(Json(DeleteResponse { success: true }))
}
