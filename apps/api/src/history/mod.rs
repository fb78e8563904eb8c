//! Append-only conversion history.
//!
//! Entries are written once, after a conversion fully succeeds, and are
//! never updated or deleted. Reads come back newest-first for display.

pub mod handlers;

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::pipeline::GenerationResult;
use crate::models::history::HistoryEntryRow;

/// Serializes a generation result into the stored JSON shape:
/// an object keyed by platform display name.
pub fn outputs_to_json(outputs: &GenerationResult) -> Value {
    let map: Map<String, Value> = outputs
        .iter()
        .map(|(platform, text)| (platform.display_name().to_string(), Value::from(text.clone())))
        .collect();
    Value::Object(map)
}

/// Appends one completed conversion. INSERT only — this is the sole write
/// path into the history table.
pub async fn append(
    pool: &SqlitePool,
    source_filename: &str,
    model: &str,
    outputs: &GenerationResult,
) -> Result<HistoryEntryRow, AppError> {
    let entry = HistoryEntryRow {
        id: Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        source_filename: source_filename.to_string(),
        model: model.to_string(),
        outputs: outputs_to_json(outputs),
    };

    sqlx::query(
        r#"
        INSERT INTO history_entries (id, created_at, source_filename, model, outputs)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(entry.created_at)
    .bind(&entry.source_filename)
    .bind(&entry.model)
    .bind(&entry.outputs)
    .execute(pool)
    .await?;

    Ok(entry)
}

/// Returns every entry, newest first. Ties on `created_at` fall back to
/// insertion order via rowid so the listing never reorders.
pub async fn list(pool: &SqlitePool) -> Result<Vec<HistoryEntryRow>, AppError> {
    let rows = sqlx::query_as::<_, HistoryEntryRow>(
        r#"
        SELECT id, created_at, source_filename, model, outputs
        FROM history_entries
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single entry by id, for the document download.
pub async fn get(pool: &SqlitePool, id: &str) -> Result<HistoryEntryRow, AppError> {
    let row = sqlx::query_as::<_, HistoryEntryRow>(
        r#"
        SELECT id, created_at, source_filename, model, outputs
        FROM history_entries
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| AppError::NotFound(format!("History entry {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::models::platform::Platform;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    fn sample_outputs(text: &str) -> GenerationResult {
        let mut outputs = GenerationResult::new();
        outputs.insert(Platform::LinkedIn, text.to_string());
        outputs.insert(Platform::Reddit, format!("{text} (reddit)"));
        outputs
    }

    #[tokio::test]
    async fn test_append_then_list_newest_first() {
        let pool = test_pool().await;
        let first = append(&pool, "q1.pdf", "gpt-4o", &sample_outputs("one"))
            .await
            .unwrap();
        let second = append(&pool, "q2.pdf", "gpt-4o", &sample_outputs("two"))
            .await
            .unwrap();
        let third = append(&pool, "q3.pdf", "claude-sonnet-4-5", &sample_outputs("three"))
            .await
            .unwrap();

        let listed = list(&pool).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].id, third.id);
        assert_eq!(listed[1].id, second.id);
        assert_eq!(listed[2].id, first.id);
    }

    #[tokio::test]
    async fn test_entries_survive_later_appends_unchanged() {
        let pool = test_pool().await;
        let entry = append(&pool, "report.pdf", "qwen-plus", &sample_outputs("original"))
            .await
            .unwrap();

        append(&pool, "other.pdf", "gemini-2.0-flash", &sample_outputs("later"))
            .await
            .unwrap();

        let fetched = get(&pool, &entry.id).await.unwrap();
        assert_eq!(fetched.source_filename, "report.pdf");
        assert_eq!(fetched.model, "qwen-plus");
        assert_eq!(fetched.outputs, entry.outputs);
    }

    #[tokio::test]
    async fn test_file_backed_log_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/history.db", dir.path().display());
        let pool = crate::db::create_pool(&url).await.unwrap();
        init_schema(&pool).await.unwrap();

        append(&pool, "q4.pdf", "gpt-4o", &sample_outputs("persisted"))
            .await
            .unwrap();
        let listed = list(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].source_filename, "q4.pdf");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let pool = test_pool().await;
        let err = get(&pool, "no-such-id").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_outputs_json_keys_are_display_names() {
        let json = outputs_to_json(&sample_outputs("text"));
        assert!(json.get("LinkedIn").is_some());
        assert!(json.get("Reddit").is_some());
        assert_eq!(json["LinkedIn"], "text");
    }
}
