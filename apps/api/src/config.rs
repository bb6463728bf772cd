use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-5.2";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm: LlmSettings,
    pub retry: RetrySettings,
    pub prompts_dir: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

/// Connection settings for the chat-completions provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut llm = LlmSettings::resolve(None, None)?;
        if let Some(model) = optional_env("LLM_MODEL") {
            llm.model = model;
        }
        llm.timeout = Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?);

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            llm,
            retry: RetrySettings {
                max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
                base_delay: Duration::from_millis(parse_env("LLM_RETRY_BASE_MS", 1000)?),
                max_delay: Duration::from_millis(parse_env("LLM_RETRY_MAX_MS", 30_000)?),
            },
            prompts_dir: optional_env("PROMPTS_DIR").map(PathBuf::from),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl LlmSettings {
    /// Builds provider settings from explicit values, falling back to
    /// `OPENAI_API_KEY` / `OPENAI_BASE_URL` for anything left empty.
    pub fn resolve(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = non_empty(api_key)
            .or_else(|| optional_env("OPENAI_API_KEY"))
            .context("LLM API key is not set (pass it explicitly or set OPENAI_API_KEY)")?;
        let base_url = non_empty(base_url)
            .or_else(|| optional_env("OPENAI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("LLM base URL must be an http(s) URL, got '{base_url}'");
        }

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn optional_env(key: &str) -> Option<String> {
    non_empty(std::env::var(key).ok())
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {key}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_settings_take_precedence() {
        let settings = LlmSettings::resolve(
            Some("sk-explicit".to_string()),
            Some("http://localhost:4000/v1/".to_string()),
        )
        .unwrap();
        assert_eq!(settings.api_key, "sk-explicit");
        assert_eq!(settings.base_url, "http://localhost:4000/v1");
        assert_eq!(settings.model, DEFAULT_LLM_MODEL);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = LlmSettings::resolve(
            Some("sk-explicit".to_string()),
            Some("localhost:4000".to_string()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_empty_filters_blank_values() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
