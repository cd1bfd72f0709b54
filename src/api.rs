//! Core domain types for the land analysis pipeline.
//!
//! These types form the data contract shared by the classifier, the record
//! store, the capture session and the HTTP layer. Wire field names follow the
//! storage schema (`user_id`, `image_url`, `analysis_result`) so serialized
//! records match what existing clients expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an analysis record.
///
/// Assigned by the record store at insertion time; never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of the owner of a record.
///
/// Every record is visible and deletable only by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single geolocation fix.
///
/// Produced once per capture attempt and immutable afterwards. `altitude`
/// and `accuracy` are only present when the device reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, valid range [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, valid range [-180, 180]
    pub longitude: f64,
    /// Altitude in meters above sea level, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Horizontal accuracy in meters (>= 0), if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl Coordinate {
    /// Create a coordinate without altitude or accuracy.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
        }
    }

    /// Validate value ranges.
    ///
    /// Returns a human-readable description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} outside [-90, 90]", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude {} outside [-180, 180]", self.longitude));
        }
        if let Some(acc) = self.accuracy {
            if !acc.is_finite() || acc < 0.0 {
                return Err(format!("accuracy {} must be >= 0", acc));
            }
        }
        Ok(())
    }
}

/// Land-characteristics report derived from a coordinate.
///
/// Immutable once produced by the classifier. `features` and
/// `recommendations` are non-empty for every latitude band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandReport {
    pub terrain: String,
    pub vegetation: String,
    pub soil_type: String,
    pub land_use: String,
    pub features: Vec<String>,
    pub recommendations: Vec<String>,
}

/// A persisted land analysis.
///
/// Created exactly once at submission time with store-assigned id and
/// timestamps; never updated, only deleted by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: RecordId,
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Encoded image payload (or a reference to stored image bytes)
    #[serde(rename = "image_url")]
    pub image_data: String,
    #[serde(rename = "analysis_result")]
    pub report: LandReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an analysis record.
///
/// Carries everything the store needs except the id and timestamps, which
/// the store assigns.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub owner_id: OwnerId,
    pub coordinate: Coordinate,
    pub image_data: String,
    pub report: LandReport,
    pub notes: Option<String>,
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
