use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Creates and returns a SQLite connection pool for the history log.
/// The database file is created on first run.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening history database at {database_url}...");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("History database pool established");
    Ok(pool)
}

/// Creates the history schema if it does not exist.
/// The table is append-only by convention: no UPDATE or DELETE is issued
/// anywhere in this codebase.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history_entries (
            id              TEXT PRIMARY KEY,
            created_at      TEXT NOT NULL,
            source_filename TEXT NOT NULL,
            model           TEXT NOT NULL,
            outputs         TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
