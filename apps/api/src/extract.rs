//! PDF text extraction — the first stage of the conversion pipeline.
//!
//! Extraction is delegated to `pdf-extract`, which walks pages in document
//! order. The only policy here is the failure contract: a PDF that parses
//! but yields no text (an image-only scan) is an extraction error the UI
//! must surface, never an empty prompt sent to a provider.

use tracing::debug;

use crate::errors::AppError;

/// Extracts the full plain-text content of an uploaded PDF, in page order.
pub fn extract_report_text(bytes: &[u8]) -> Result<String, AppError> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("Could not read PDF: {e}")))?;

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(AppError::Extraction(
            "The PDF contains no extractable text (image-only scan?)".to_string(),
        ));
    }

    debug!("Extracted {} characters from PDF", text.len());
    Ok(text)
}

/// Collapses runs of blank lines and trims trailing space, preserving the
/// line structure extraction produced. Page order is untouched.
fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0usize;

    for line in raw.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(line);
    }

    out
}
