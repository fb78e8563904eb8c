//! Qwen-class provider: Alibaba DashScope's OpenAI-compatible endpoint.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use super::openai::submit_chat;
use super::{CompletionProvider, LlmError};

const API_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

pub struct QwenProvider {
    http: HttpClient,
    api_key: String,
    model: String,
}

impl QwenProvider {
    pub fn new(http: HttpClient, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for QwenProvider {
    fn name(&self) -> &'static str {
        "qwen"
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
        debug!("Qwen call succeeded ({} chars)", text.len());
        Ok(text)
    }
}
