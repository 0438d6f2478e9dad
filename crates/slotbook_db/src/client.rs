//! Database client for Slotbook
//!
//! A thin wrapper around an SQLx `Any` pool so the repositories stay agnostic of
//! the concrete backend (SQLite by default).

use crate::error::DbError;
use slotbook_config::{AppConfig, DatabaseConfig};
use sqlx::pool::PoolOptions;
use sqlx::{Pool, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database transaction
pub type DbTransaction<'a> = Transaction<'a, sqlx::Any>;

/// URL of a private, process-local SQLite database.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Database client for Slotbook
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: Pool<sqlx::Any>,
}

impl DbClient {
    /// Create a new database client from the application configuration.
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        Self::from_config(&config.database).await
    }

    /// Create a new database client from a database configuration.
    ///
    /// # Errors
    ///
    /// * The database URL is empty
    /// * The database connection fails
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }
        Self::from_url(&db_config.url).await
    }

    /// Create a new database client from a database URL.
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }
        let pool = Self::create_pool(db_url).await?;
        Ok(Self { pool })
    }

    /// A fresh, empty in-memory database. Every call returns an independent store.
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::from_url(IN_MEMORY_URL).await
    }

    async fn create_pool(db_url: &str) -> Result<Pool<sqlx::Any>, DbError> {
        debug!("Creating database pool with URL: {}", db_url);

        sqlx::any::install_default_drivers();

        let in_memory = db_url.contains(":memory:");
        let pool_options = if in_memory {
            // Each SQLite connection to :memory: is its own database, so keep exactly one alive.
            PoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            PoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(Duration::from_secs(600))
        };

        if !in_memory {
            if let Some(db_path) = sqlite_file_path(db_url) {
                ensure_sqlite_file(db_path)?;
            }
        }

        let connect_options = sqlx::any::AnyConnectOptions::from_str(db_url)
            .map_err(|e| DbError::UrlError(e.to_string()))?;
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    /// Begin a transaction
    pub async fn begin(&self) -> Result<DbTransaction<'_>, DbError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    /// Execute a statement that returns no rows; yields the number of rows affected.
    pub async fn execute(&self, query: &str) -> Result<u64, DbError> {
        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Check if the database is healthy
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient")
    }
}

/// Extracts the file path from `sqlite:path` / `sqlite://path` URLs.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}

/// SQLite through the `Any` driver will not create a missing database file.
fn ensure_sqlite_file(db_path: &str) -> Result<(), DbError> {
    let path = Path::new(db_path);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            debug!("Creating directory for SQLite database: {:?}", dir);
            std::fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory for SQLite database: {}", e);
                DbError::PoolError(format!("Failed to create directory: {}", e))
            })?;
        }
    }
    if !path.exists() {
        debug!("Creating empty SQLite database file: {}", db_path);
        std::fs::File::create(path).map_err(|e| {
            error!("Failed to create SQLite database file: {}", e);
            DbError::PoolError(format!("Failed to create database file: {}", e))
        })?;
    }
    Ok(())
}
