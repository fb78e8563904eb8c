//! Model Client — the single point of entry for all LLM completion calls.
//!
//! ARCHITECTURAL RULE: No other module may talk to a provider API directly.
//! Each vendor class implements [`CompletionProvider`]; everything upstream
//! of this module sees one `submit` contract and one error taxonomy.
//!
//! There is deliberately no retry loop here. Rate limits and transient
//! network failures surface to the UI and the user re-invokes the action.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use thiserror::Error;

use crate::config::ProviderKeys;
use crate::errors::AppError;

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod qwen;

/// Token ceiling applied to every provider call.
pub const MAX_TOKENS: u32 = 4096;
/// Sampling temperature for marketing copy. High enough for voice, low
/// enough to stay grounded in the report.
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider returned empty content")]
    Empty,
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Auth(msg) => AppError::Auth(msg),
            LlmError::RateLimited(msg) => AppError::RateLimited(msg),
            LlmError::Network(msg) => AppError::Network(msg),
            LlmError::Api { status, message } => {
                AppError::Network(format!("provider returned status {status}: {message}"))
            }
            LlmError::Parse(e) => AppError::Formatting(format!("malformed provider response: {e}")),
            LlmError::Empty => AppError::Formatting("provider returned empty content".to_string()),
        }
    }
}

/// The submit contract every vendor class implements.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Vendor class name, for logging.
    fn name(&self) -> &'static str;

    /// Sends one prompt and returns the generated text.
    async fn submit(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Maps a non-success HTTP status from any provider onto the shared taxonomy.
/// 401/403 are credential problems, 429 is throttling, 5xx is treated as a
/// transient network-class failure; anything else is an opaque API error.
pub(crate) fn classify_status(status: u16, message: String) -> LlmError {
    match status {
        401 | 403 => LlmError::Auth(message),
        429 => LlmError::RateLimited(message),
        500..=599 => LlmError::Network(format!("provider returned status {status}: {message}")),
        _ => LlmError::Api { status, message },
    }
}

/// Maps a reqwest transport error (connect, timeout, TLS) onto the taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> LlmError {
    LlmError::Network(e.to_string())
}

/// Resolves a model identifier to its vendor class and constructs the
/// provider. A key supplied with the request wins over the env default.
pub fn resolve(
    model: &str,
    request_key: Option<&str>,
    defaults: &ProviderKeys,
    http: &HttpClient,
) -> Result<Box<dyn CompletionProvider>, AppError> {
    let model = model.trim();
    let lower = model.to_ascii_lowercase();

    if lower.starts_with("claude") {
        let key = pick_key(request_key, defaults.anthropic.as_deref(), "Claude")?;
        Ok(Box::new(anthropic::AnthropicProvider::new(
            http.clone(),
            key,
            model.to_string(),
        )))
    } else if lower.starts_with("gpt") {
        let key = pick_key(request_key, defaults.openai.as_deref(), "GPT")?;
        Ok(Box::new(openai::OpenAiProvider::new(
            http.clone(),
            key,
            model.to_string(),
        )))
    } else if lower.starts_with("gemini") {
        let key = pick_key(request_key, defaults.gemini.as_deref(), "Gemini")?;
        Ok(Box::new(gemini::GeminiProvider::new(
            http.clone(),
            key,
            model.to_string(),
        )))
    } else if lower.starts_with("qwen") {
        let key = pick_key(request_key, defaults.qwen.as_deref(), "Qwen")?;
        Ok(Box::new(qwen::QwenProvider::new(
            http.clone(),
            key,
            model.to_string(),
        )))
    } else {
        Err(AppError::Validation(format!(
            "Unknown model '{model}' (expected a claude-, gpt-, gemini-, or qwen-class identifier)"
        )))
    }
}

fn pick_key(
    request_key: Option<&str>,
    default_key: Option<&str>,
    vendor: &str,
) -> Result<String, AppError> {
    request_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or(default_key)
        .map(String::from)
        .ok_or_else(|| {
            AppError::Auth(format!(
                "No API key for {vendor} models: enter one in the form or configure the server default"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults_with_all_keys() -> ProviderKeys {
        ProviderKeys {
            anthropic: Some("ak".into()),
            openai: Some("ok".into()),
            gemini: Some("gk".into()),
            qwen: Some("qk".into()),
        }
    }

    #[test]
    fn test_resolve_dispatches_on_model_prefix() {
        let http = HttpClient::new();
        let keys = defaults_with_all_keys();
        for (model, vendor) in [
            ("claude-sonnet-4-5", "anthropic"),
            ("gpt-4o", "openai"),
            ("gemini-2.0-flash", "gemini"),
            ("qwen-plus", "qwen"),
        ] {
            let provider = resolve(model, None, &keys, &http).unwrap();
            assert_eq!(provider.name(), vendor, "model {model}");
        }
    }

    #[test]
    fn test_resolve_rejects_unknown_model() {
        let http = HttpClient::new();
        // map to () first: the boxed trait object has no Debug impl
        let err = resolve("llama-3-70b", None, &defaults_with_all_keys(), &http)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_resolve_requires_some_key() {
        let http = HttpClient::new();
        let err = resolve("gpt-4o", None, &ProviderKeys::default(), &http)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_request_key_wins_over_blank() {
        // A blank form field must not shadow the env default.
        let http = HttpClient::new();
        assert!(resolve("gpt-4o", Some("  "), &defaults_with_all_keys(), &http).is_ok());
    }

    #[test]
    fn test_undecodable_response_maps_to_formatting() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let app = AppError::from(LlmError::from(json_err));
        assert!(matches!(app, AppError::Formatting(_)));
    }

    #[test]
    fn test_classify_status_taxonomy() {
        assert!(matches!(classify_status(401, String::new()), LlmError::Auth(_)));
        assert!(matches!(classify_status(403, String::new()), LlmError::Auth(_)));
        assert!(matches!(
            classify_status(429, String::new()),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(503, String::new()),
            LlmError::Network(_)
        ));
        assert!(matches!(
            classify_status(400, String::new()),
            LlmError::Api { status: 400, .. }
        ));
    }
}
