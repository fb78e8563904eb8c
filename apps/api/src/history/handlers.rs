use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::errors::AppError;
use crate::generation::pipeline::GenerationResult;
use crate::models::history::HistoryEntryRow;
use crate::models::platform::Platform;
use crate::render;
use crate::state::AppState;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// GET /api/v1/history — all past conversions, newest first.
pub async fn handle_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntryRow>>, AppError> {
    let entries = super::list(&state.db).await?;
    Ok(Json(entries))
}

/// GET /api/v1/history/:id/document — renders the stored outputs of one
/// conversion into a downloadable Word document.
pub async fn handle_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let entry = super::get(&state.db, &id).await?;
    let outputs = outputs_from_json(&entry.outputs)?;
    let bytes = render::build_document(&entry.source_filename, &outputs)?;

    let attachment = format!(
        "attachment; filename=\"{}\"",
        attachment_filename(&entry.source_filename)
    );

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, attachment),
        ],
        bytes,
    )
        .into_response())
}

/// Builds a download filename from the stored source filename.
/// The name is user-supplied: quotes, backslashes, control characters, and
/// non-ASCII would corrupt the Content-Disposition quoted-string (or fail
/// header-value conversion), so anything outside printable ASCII becomes '_'.
fn attachment_filename(source: &str) -> String {
    let stem = source.trim_end_matches(".pdf").trim_end_matches(".PDF");
    let safe: String = stem
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}-copy.docx")
}

/// Rebuilds the platform→text mapping from the stored JSON object.
fn outputs_from_json(value: &Value) -> Result<GenerationResult, AppError> {
    let object = value.as_object().ok_or_else(|| {
        AppError::Formatting("Stored outputs are not a JSON object".to_string())
    })?;

    let mut outputs = GenerationResult::new();
    for (key, text) in object {
        let platform = Platform::parse(key)
            .map_err(|_| AppError::Formatting(format!("Stored entry has unknown platform '{key}'")))?;
        let text = text.as_str().ok_or_else(|| {
            AppError::Formatting(format!("Stored output for '{key}' is not a string"))
        })?;
        outputs.insert(platform, text.to_string());
    }

    Ok(outputs)
}
