//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic migration execution on startup
//! - Blocking Diesel calls wrapped in `tokio::task::spawn_blocking`
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use std::time::Duration;

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tokio::task;
use uuid::Uuid;

use crate::api::{AnalysisRecord, NewAnalysis, OwnerId, RecordId};
use crate::db::repository::{
    AnalysisRepository, ErrorContext, RepositoryError, RepositoryResult,
};

mod models;
mod schema;

use models::{LandAnalysisRow, NewLandAnalysisRow};
use schema::land_analyses;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let parse_var = |name: &str, default: u64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            database_url,
            max_pool_size: parse_var("PG_POOL_MAX", 10) as u32,
            min_pool_size: parse_var("PG_POOL_MIN", 1) as u32,
            connection_timeout_sec: parse_var("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: parse_var("PG_IDLE_TIMEOUT_SEC", 600),
        })
    }
}

/// PostgreSQL-backed analysis record store.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Connect, build the pool and run pending migrations.
    pub fn new(config: &PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .build(manager)
            .map_err(|e| RepositoryError::connection(format!("Failed to build pool: {}", e)))?;

        let repo = Self { pool };
        repo.run_migrations()?;
        Ok(repo)
    }

    fn run_migrations(&self) -> RepositoryResult<()> {
        let mut conn = self.pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| {
                RepositoryError::configuration(format!("Migration failed: {}", e))
            })?;
        log::info!("Postgres migrations up to date");
        Ok(())
    }

    fn pool(&self) -> PgPool {
        self.pool.clone()
    }
}

#[async_trait]
impl AnalysisRepository for PostgresRepository {
    async fn insert_analysis(&self, new: NewAnalysis) -> RepositoryResult<AnalysisRecord> {
        let pool = self.pool();
        let report_json = serde_json::to_value(&new.report).map_err(|e| {
            RepositoryError::internal(format!("Failed to serialize report: {}", e))
        })?;

        let row = NewLandAnalysisRow {
            id: Uuid::new_v4().to_string(),
            user_id: new.owner_id.0,
            latitude: new.coordinate.latitude,
            longitude: new.coordinate.longitude,
            altitude: new.coordinate.altitude,
            accuracy: new.coordinate.accuracy,
            image_url: new.image_data,
            analysis_result: report_json,
            notes: new.notes,
        };

        let inserted: LandAnalysisRow = task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let row: LandAnalysisRow = diesel::insert_into(land_analyses::table)
                .values(&row)
                .returning(LandAnalysisRow::as_returning())
                .get_result(&mut conn)
                .map_err(|e| {
                    RepositoryError::from(e).with_operation("insert_analysis")
                })?;
            Ok::<_, RepositoryError>(row)
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;

        inserted.into_record()
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> RepositoryResult<Vec<AnalysisRecord>> {
        let pool = self.pool();
        let owner = owner.0.clone();

        let rows: Vec<LandAnalysisRow> = task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let rows = land_analyses::table
                .filter(land_analyses::user_id.eq(&owner))
                .order(land_analyses::created_at.desc())
                .select(LandAnalysisRow::as_select())
                .load(&mut conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_by_owner"))?;
            Ok::<_, RepositoryError>(rows)
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;

        rows.into_iter().map(|row| row.into_record()).collect()
    }

    async fn delete_by_id(&self, owner: &OwnerId, id: &RecordId) -> RepositoryResult<()> {
        let pool = self.pool();
        let owner = owner.0.clone();
        let id = id.0.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            // Ownership is part of the predicate, so a foreign record and a
            // missing record both delete zero rows.
            let deleted = diesel::delete(
                land_analyses::table.filter(
                    land_analyses::id
                        .eq(&id)
                        .and(land_analyses::user_id.eq(&owner)),
                ),
            )
            .execute(&mut conn)
            .map_err(|e| RepositoryError::from(e).with_operation("delete_by_id"))?;

            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("No analysis {} for this owner", id),
                    ErrorContext::new("delete_by_id")
                        .with_entity("analysis")
                        .with_entity_id(&id),
                ));
            }
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        let pool = self.pool();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            sql_query("SELECT 1")
                .execute(&mut conn)
                .map_err(RepositoryError::from)?;
            Ok::<_, RepositoryError>(true)
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
    }
}
