use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::land_analyses;
use crate::api::{AnalysisRecord, Coordinate, LandReport, OwnerId, RecordId};
use crate::db::repository::RepositoryError;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = land_analyses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LandAnalysisRow {
    pub id: String,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub image_url: String,
    pub analysis_result: Value,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = land_analyses)]
pub struct NewLandAnalysisRow {
    pub id: String,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub image_url: String,
    pub analysis_result: Value,
    pub notes: Option<String>,
}

impl LandAnalysisRow {
    /// Convert a database row into the domain record.
    ///
    /// Fails only if the stored report JSON does not match the `LandReport`
    /// shape, which indicates store corruption rather than a caller error.
    pub fn into_record(self) -> Result<AnalysisRecord, RepositoryError> {
        let report: LandReport = serde_json::from_value(self.analysis_result)
            .map_err(|e| RepositoryError::internal(format!("Malformed stored report: {}", e)))?;

        Ok(AnalysisRecord {
            id: RecordId::new(self.id),
            owner_id: OwnerId::new(self.user_id),
            coordinate: Coordinate {
                latitude: self.latitude,
                longitude: self.longitude,
                altitude: self.altitude,
                accuracy: self.accuracy,
            },
            image_data: self.image_url,
            report,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
