//! Postgres connection pool.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::DbError;

/// Type alias for the shared Postgres pool used across the whole application.
pub type DbPool = PgPool;

/// Connection settings for [`create_pool`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    /// Pool ceiling.
    pub max_connections: u32,
    /// How long a caller waits for a free connection before the statement fails.
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Reject settings that can never produce a working pool.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.database_url.trim().is_empty() {
            return Err(DbError::Config("database_url is empty".into()));
        }
        if self.max_connections == 0 {
            return Err(DbError::Config("max_connections must be at least 1".into()));
        }
        Ok(())
    }
}

/// Create a new connection pool from `config`.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, DbError> {
    config.validate()?;

    info!(
        "Connecting to database (max_connections={}, acquire_timeout={:?})",
        config.max_connections, config.acquire_timeout
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}
