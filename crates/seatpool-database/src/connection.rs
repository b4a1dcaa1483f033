//! PostgreSQL backing for the session store: pool setup, embedded schema
//! migrations, and a schema-aware health probe.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use seatpool_core::config::DatabaseConfig;
use seatpool_core::error::{AppError, ErrorKind};
use seatpool_core::result::AppResult;

/// Schema for `active_sessions`, embedded at compile time.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Connection pool for the `active_sessions` table.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connect with the configured pool limits and bring the session schema
    /// up to date.
    ///
    /// A malformed `database.url` is a configuration error; an unreachable
    /// server or a failed migration is `StorageUnavailable`.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let options: PgConnectOptions = config.url.parse().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "database.url is not a valid PostgreSQL URL",
                e,
            )
        })?;

        info!(
            target_db = %describe(&options),
            max_connections = config.max_connections,
            acquire_timeout_seconds = config.connect_timeout_seconds,
            "Opening session store database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    "Failed to connect to session store database",
                    e,
                )
            })?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> AppResult<()> {
        MIGRATOR.run(&self.pool).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                "Failed to migrate session store schema",
                e,
            )
        })?;

        info!(
            migrations = MIGRATOR.iter().count(),
            "Session store schema is current"
        );
        Ok(())
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether the server answers and the `active_sessions` table exists.
    pub async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT to_regclass('active_sessions') IS NOT NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    "Session store health check failed",
                    e,
                )
            })
    }

    /// Close all connections; in-flight queries finish first.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Session store database closed");
    }
}

/// `user@host:port/database`, never including the password.
fn describe(options: &PgConnectOptions) -> String {
    format!(
        "{}@{}:{}/{}",
        options.get_username(),
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or("-")
    )
}
