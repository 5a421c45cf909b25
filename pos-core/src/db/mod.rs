//! Database Module
//!
//! SQLite connection pool and embedded migrations.

pub mod repository;

use shared::PosError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Database service — owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) a database file with WAL mode and run migrations.
    pub async fn new(db_path: &str) -> Result<Self, PosError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| PosError::Database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| PosError::Database(format!("Failed to open database: {e}")))?;

        // Wait up to 5s on write contention instead of failing immediately
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| PosError::Database(format!("Failed to set busy_timeout: {e}")))?;

        Self::migrate(&pool).await?;
        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Ok(Self { pool })
    }

    /// In-memory database for tests: same schema, no file.
    pub async fn in_memory() -> Result<Self, PosError> {
        let pool = SqlitePoolOptions::new()
            // A single connection keeps every query on the same :memory: db
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| PosError::Database(format!("Failed to open in-memory database: {e}")))?;

        sqlx::query("PRAGMA foreign_keys = ON;")
            .execute(&pool)
            .await
            .map_err(|e| PosError::Database(e.to_string()))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), PosError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| PosError::Database(format!("Failed to apply migrations: {e}")))?;
        Ok(())
    }
}
