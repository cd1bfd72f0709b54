//! Data Transfer Objects for the HTTP API.
//!
//! The request body uses camelCase keys (`imageData`) and the response
//! envelope is `{"success": true, "data": ...}`, both matching the original
//! wire contract.

use serde::{Deserialize, Serialize};

use crate::api::{AnalysisRecord, Coordinate};
use crate::db::services::Submission;

/// Request body for `POST /analyze-land`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeLandRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Encoded image payload (e.g. a base64 data URL)
    pub image_data: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<AnalyzeLandRequest> for Submission {
    fn from(req: AnalyzeLandRequest) -> Self {
        Submission {
            coordinate: Coordinate {
                latitude: req.latitude,
                longitude: req.longitude,
                altitude: req.altitude,
                accuracy: req.accuracy,
            },
            image_data: req.image_data,
            notes: req.notes,
        }
    }
}

/// Success envelope wrapping a single record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub data: AnalysisRecord,
}

/// Success envelope wrapping the owner's record list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisListResponse {
    pub success: bool,
    pub data: Vec<AnalysisRecord>,
}

/// Success envelope for deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Record store connection status
    pub database: String,
}
