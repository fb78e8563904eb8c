use reqwest::Client as HttpClient;
use sqlx::SqlitePool;

use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// SQLite pool backing the append-only conversion history.
    pub db: SqlitePool,
    /// Single reqwest client reused across all provider calls.
    pub http: HttpClient,
    pub config: Config,
}
