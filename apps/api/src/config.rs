use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Provider API keys are all optional here: a key entered in the UI always
/// wins, and the env value is only the fallback. A provider with neither
/// fails with an auth error at call time, not at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub provider_keys: ProviderKeys,
}

/// Env-supplied default API keys, one per provider class.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub gemini: Option<String>,
    pub qwen: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("HISTORY_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:recast_history.db".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            provider_keys: ProviderKeys {
                anthropic: optional_env("ANTHROPIC_API_KEY"),
                openai: optional_env("OPENAI_API_KEY"),
                gemini: optional_env("GEMINI_API_KEY"),
                qwen: optional_env("DASHSCOPE_API_KEY"),
            },
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
