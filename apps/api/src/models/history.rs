use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// One completed conversion, as stored in and read back from the history log.
///
/// Rows are immutable once written: the store exposes append and read
/// operations only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryEntryRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub source_filename: String,
    pub model: String,
    /// JSON object mapping platform display name to generated text.
    pub outputs: Value,
}
