//! The conversion pipeline: extract once, then one provider call per
//! selected platform, sequentially, in stable platform order.
//!
//! A failure at any stage aborts the whole conversion; nothing reaches the
//! history store unless every platform succeeded.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::extract_report_text;
use crate::generation::prompts::{build_prompt, GENERATION_SYSTEM};
use crate::models::platform::Platform;
use crate::providers::CompletionProvider;

/// Per-platform generated copy for one report. Ephemeral: valid only for
/// the request that produced it.
pub type GenerationResult = BTreeMap<Platform, String>;

/// Upper bound on report characters forwarded to a provider. Long reports
/// blow past provider input limits and fail wholesale with an opaque API
/// error, so anything past this is cut before prompting.
pub const MAX_REPORT_CHARS: usize = 24_000;

/// Runs the full conversion for an uploaded PDF.
/// Extraction failures return before any provider call is made.
pub async fn convert(
    provider: &dyn CompletionProvider,
    pdf_bytes: &[u8],
    platforms: &[Platform],
    style: Option<&str>,
) -> Result<GenerationResult, AppError> {
    let report_text = extract_report_text(pdf_bytes)?;
    let bounded = bound_report(&report_text);
    if bounded.len() < report_text.len() {
        warn!(
            "Report text cut from {} to {} characters for prompting",
            report_text.chars().count(),
            MAX_REPORT_CHARS
        );
    }
    generate_all(provider, bounded, platforms, style).await
}

/// Cuts the report at [`MAX_REPORT_CHARS`] characters, on a character
/// boundary so multi-byte text never splits mid-scalar.
fn bound_report(text: &str) -> &str {
    match text.char_indices().nth(MAX_REPORT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Generates copy for each selected platform from already-extracted text.
/// Calls are sequential on purpose: the documented design has no
/// cross-platform parallelism.
pub async fn generate_all(
    provider: &dyn CompletionProvider,
    report_text: &str,
    platforms: &[Platform],
    style: Option<&str>,
) -> Result<GenerationResult, AppError> {
    if platforms.is_empty() {
        return Err(AppError::Validation(
            "Select at least one target platform".to_string(),
        ));
    }

    let mut selected: Vec<Platform> = platforms.to_vec();
    selected.sort();
    selected.dedup();

    let mut outputs = GenerationResult::new();
    for platform in selected {
        info!(
            "Generating {} copy via {}",
            platform.display_name(),
            provider.name()
        );
        let prompt = build_prompt(report_text, platform, style);
        let text = provider.submit(GENERATION_SYSTEM, &prompt).await?;
        outputs.insert(platform, text);
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double that echoes the platform directive it was asked for,
    /// or fails every call with a fixed error.
    struct FakeProvider {
        calls: AtomicUsize,
        fail_with: Option<fn() -> LlmError>,
    }

    impl FakeProvider {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(f: fn() -> LlmError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(f),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn submit(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            Ok(format!("copy #{n} for: {}", &prompt[..20.min(prompt.len())]))
        }
    }

    #[tokio::test]
    async fn test_generate_all_covers_every_platform() {
        let provider = FakeProvider::ok();
        let outputs = generate_all(&provider, "report text", &Platform::ALL, None)
            .await
            .unwrap();
        assert_eq!(outputs.len(), 4);
        assert_eq!(provider.call_count(), 4);
        for platform in Platform::ALL {
            assert!(outputs.contains_key(&platform));
        }
    }

    #[tokio::test]
    async fn test_generate_all_dedups_platforms() {
        let provider = FakeProvider::ok();
        let outputs = generate_all(
            &provider,
            "report text",
            &[Platform::Twitter, Platform::Twitter],
            None,
        )
        .await
        .unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_all_rejects_empty_selection() {
        let provider = FakeProvider::ok();
        let err = generate_all(&provider, "report text", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces_as_auth_error() {
        let provider = FakeProvider::failing(|| LlmError::Auth("bad key".into()));
        let err = generate_all(&provider, "report text", &[Platform::LinkedIn], None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_bound_report_passes_short_text_through() {
        let text = "Q3 revenue up 12%";
        assert_eq!(bound_report(text), text);
    }

    #[test]
    fn test_bound_report_cuts_long_text_at_limit() {
        let text = "r".repeat(MAX_REPORT_CHARS + 500);
        let bounded = bound_report(&text);
        assert_eq!(bounded.chars().count(), MAX_REPORT_CHARS);
    }

    #[test]
    fn test_bound_report_respects_multibyte_boundaries() {
        // 3-byte scalars: the cut must land between characters, not bytes.
        let text = "报".repeat(MAX_REPORT_CHARS + 10);
        let bounded = bound_report(&text);
        assert_eq!(bounded.chars().count(), MAX_REPORT_CHARS);
        assert!(bounded.ends_with('报'));
    }

    #[tokio::test]
    async fn test_extraction_failure_never_reaches_provider() {
        let provider = FakeProvider::ok();
        let err = convert(&provider, b"not a pdf at all", &Platform::ALL, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert_eq!(provider.call_count(), 0);
    }
}
