//! GPT-class provider: the OpenAI chat completions API.
//!
//! The wire types here are shared with the Qwen provider, which speaks the
//! same chat-completions shape against a different endpoint.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{classify_status, transport_error, CompletionProvider, LlmError, MAX_TOKENS, TEMPERATURE};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiError {
    pub error: ChatApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiErrorBody {
    pub message: String,
}

/// Posts one chat-completions request and extracts the first choice.
/// Shared by the OpenAI and Qwen providers.
pub(crate) async fn submit_chat(
    http: &HttpClient,
    url: &str,
    api_key: &str,
    model: &str,
    system: &str,
    prompt: &str,
) -> Result<String, LlmError> {
    let body = ChatRequest {
        model,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
    };

    let response = http
        .post(url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ChatApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(classify_status(status.as_u16(), message));
    }

    let raw = response.text().await.map_err(transport_error)?;
    let parsed: ChatResponse = serde_json::from_str(&raw)?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or(LlmError::Empty)
}

pub struct OpenAiProvider {
    http: HttpClient,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(http: HttpClient, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn submit(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let text = submit_chat(
            &self.http,
            API_URL,
            &self.api_key,
            &self.model,
            system,
            prompt,
        )
        .await?;
        debug!("OpenAI call succeeded ({} chars)", text.len());
        Ok(text)
    }
}
