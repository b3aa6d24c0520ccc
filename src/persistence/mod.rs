//! Persistence Layer
//!
//! SQLite storage for the trade ledger, the portfolio and user settings,
//! with async access via sqlx. An in-memory variant backs tests and
//! ephemeral runs.
//!
//! # Database Schema
//!
//! ## trades
//! - id: client order id (primary key, makes fills idempotent)
//! - order_id: exchange order id
//! - symbol, side ("BUY"/"SELL"), amount (asset units), price
//! - executed_at: timestamp
//!
//! ## failed_orders
//! - client_order_id, symbol, side, reason, attempted_at
//!
//! ## portfolio
//! - symbol (primary key), amount (never negative, zero rows deleted)
//!
//! ## settings
//! - key (primary key), value (JSON)

pub mod memory;
pub mod models;
pub mod repository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::domain::errors::TradingError;

/// Database connection pool
pub type DbPool = SqlitePool;

/// Database initialization error
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

impl From<DatabaseError> for TradingError {
    fn from(err: DatabaseError) -> Self {
        TradingError::Storage(err.to_string())
    }
}

/// Initialize the database connection pool
///
/// `database_url` is a sqlx SQLite URL, e.g. "sqlite://data/signalpilot.db"
/// or "sqlite::memory:". In-memory databases get a single connection so
/// every query sees the same data.
pub async fn init_database(database_url: &str) -> Result<DbPool, DatabaseError> {
    info!("Initializing database: {}", database_url);

    if let Some(db_path) = database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::ConnectionError(sqlx::Error::Configuration(Box::new(e)))
                })?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .log_statements(tracing::log::LevelFilter::Debug);

    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!("✓ Database initialized successfully");

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    info!("Running database migrations...");

    let statements = [
        (
            "trades",
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL CHECK(side IN ('BUY', 'SELL')),
                amount REAL NOT NULL CHECK(amount > 0),
                price REAL NOT NULL,
                executed_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "failed_orders",
            r#"
            CREATE TABLE IF NOT EXISTS failed_orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_order_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                reason TEXT NOT NULL,
                attempted_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "portfolio",
            r#"
            CREATE TABLE IF NOT EXISTS portfolio (
                symbol TEXT PRIMARY KEY,
                amount REAL NOT NULL CHECK(amount >= 0)
            )
            "#,
        ),
        (
            "settings",
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ),
    ];

    for (table, sql) in statements {
        sqlx::query(sql).execute(pool).await.map_err(|e| {
            DatabaseError::MigrationError(format!("Failed to create {} table: {}", table, e))
        })?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trades_executed_at ON trades(executed_at)")
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    info!("✓ Database migrations completed successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_init() {
        let pool = init_database("sqlite::memory:").await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn test_migrations() {
        let pool = init_database("sqlite::memory:").await.unwrap();

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('trades', 'failed_orders', 'portfolio', 'settings')"
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(result.0, 4);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        assert!(run_migrations(&pool).await.is_ok());
    }
}
