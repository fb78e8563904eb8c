use axum::extract::{Multipart, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::pipeline;
use crate::history;
use crate::models::platform::Platform;
use crate::providers;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub source_filename: String,
    pub model: String,
    /// Platform display name → generated copy.
    pub outputs: Value,
}

/// The parsed multipart form for one conversion.
#[derive(Debug)]
struct ConvertForm {
    filename: String,
    file_bytes: Vec<u8>,
    model: String,
    api_key: Option<String>,
    platforms: Vec<Platform>,
    style: Option<String>,
}

/// POST /api/v1/convert
///
/// One synchronous cycle: extract → prompt → provider (per platform) →
/// history append → JSON. The history row is written only after every
/// platform succeeded, so a failed conversion leaves no trace.
pub async fn handle_convert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, AppError> {
    let form = parse_convert_form(multipart).await?;
    info!(
        "Converting '{}' with model {} for {} platform(s)",
        form.filename,
        form.model,
        form.platforms.len()
    );

    let provider = providers::resolve(
        &form.model,
        form.api_key.as_deref(),
        &state.config.provider_keys,
        &state.http,
    )?;

    let outputs = pipeline::convert(
        provider.as_ref(),
        &form.file_bytes,
        &form.platforms,
        form.style.as_deref(),
    )
    .await?;

    let entry = history::append(&state.db, &form.filename, &form.model, &outputs).await?;

    Ok(Json(ConvertResponse {
        id: entry.id,
        created_at: entry.created_at,
        source_filename: entry.source_filename,
        model: entry.model,
        outputs: entry.outputs,
    }))
}

async fn parse_convert_form(mut multipart: Multipart) -> Result<ConvertForm, AppError> {
    let mut filename = None;
    let mut file_bytes = None;
    let mut model = None;
    let mut api_key = None;
    let mut platforms = Vec::new();
    let mut style = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                filename = Some(
                    field
                        .file_name()
                        .map(String::from)
                        .unwrap_or_else(|| "report.pdf".to_string()),
                );
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
                file_bytes = Some(bytes.to_vec());
            }
            "model" => model = Some(read_text(field).await?),
            "api_key" => api_key = Some(read_text(field).await?),
            "platforms" => platforms.push(Platform::parse(&read_text(field).await?)?),
            "style" => style = Some(read_text(field).await?),
            other => {
                return Err(AppError::Validation(format!(
                    "Unexpected form field '{other}'"
                )))
            }
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| AppError::Validation("Missing 'file' upload".to_string()))?;
    if file_bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    let model = model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'model' field".to_string()))?;

    Ok(ConvertForm {
        filename: filename.unwrap_or_else(|| "report.pdf".to_string()),
        file_bytes,
        model,
        api_key: api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
        platforms,
        style: style.filter(|s| !s.trim().is_empty()),
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed form field: {e}")))
}
