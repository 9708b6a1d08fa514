//! SQLite connection pool wrapper for the storage crate.

use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Manages a single SQLite pool.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    /// Creates a pool for the given database file; creates the file (and its directory) if missing.
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        info!(database_path = %database_path, "Initializing SQLite pool");

        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(database_path);

        let pool = SqlitePool::connect_with(options).await?;

        Ok(Self { pool })
    }

    /// Opens an existing database without write access.
    pub async fn open_read_only(database_path: &str) -> Result<Self, sqlx::Error> {
        info!(database_path = %database_path, "Opening SQLite pool read-only");

        let options = SqliteConnectOptions::new()
            .read_only(true)
            .filename(database_path);

        let pool = SqlitePool::connect_with(options).await?;

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
