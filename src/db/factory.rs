//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository
//! instances based on runtime configuration.

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::{PostgresConfig, PostgresRepository};
use super::repository::{AnalysisRepository, RepositoryResult};
#[cfg(not(feature = "postgres-repo"))]
use super::repository::RepositoryError;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment.
    ///
    /// Reads `REPOSITORY_TYPE`; when unset, defaults to Postgres if a
    /// database URL is present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    pub fn create(repo_type: RepositoryType) -> RepositoryResult<Arc<dyn AnalysisRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            #[cfg(feature = "postgres-repo")]
            RepositoryType::Postgres => {
                let config = PostgresConfig::from_env()
                    .map_err(super::repository::RepositoryError::configuration)?;
                Self::create_postgres(&config)
            }
            #[cfg(not(feature = "postgres-repo"))]
            RepositoryType::Postgres => Err(RepositoryError::configuration(
                "postgres-repo feature is not enabled",
            )),
        }
    }

    /// Create an in-memory repository.
    pub fn create_local() -> Arc<dyn AnalysisRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a Postgres repository from an explicit configuration.
    #[cfg(feature = "postgres-repo")]
    pub fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<dyn AnalysisRepository>> {
        let repo = PostgresRepository::new(config)?;
        Ok(Arc::new(repo))
    }
}
