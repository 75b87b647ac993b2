pub mod config;
pub mod migrate;
pub mod operations;

use std::time::{Duration, Instant};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::config::DbConfig;
use crate::db::migrate::MigrationError;

#[derive(Clone)]
pub struct DatabaseProxy {
    pool: PgPool,
}

impl DatabaseProxy {
    pub async fn connect(config: DbConfig) -> Result<Self, DbInitError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.primary_url)
            .await?;

        if config.run_migrations {
            migrate::run_migrations(&pool).await?;
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip latency of `SELECT 1`, or `None` on failure or timeout.
    pub async fn ping(&self, timeout: Duration) -> Option<Duration> {
        let started = Instant::now();
        let result = tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(&self.pool)).await;
        match result {
            Ok(Ok(_)) => Some(started.elapsed()),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "database ping failed");
                None
            }
            Err(_) => {
                tracing::warn!("database ping timed out");
                None
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}
