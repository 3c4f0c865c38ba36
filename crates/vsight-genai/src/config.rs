//! Gemini client configuration.

use std::time::Duration;

use crate::error::{GenAiError, GenAiResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// API base URL (proxies are supported)
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Model used for generation
    pub model: String,
    /// Timeout for status and generation requests
    pub request_timeout: Duration,
    /// Timeout for the media upload request
    pub upload_timeout: Duration,
    /// Thinking token budget (`None` leaves the model default)
    pub thinking_budget: Option<i32>,
}

impl GenAiConfig {
    /// Create a config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(600),
            thinking_budget: None,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .map_err(|_| GenAiError::config("GOOGLE_API_KEY not set"))?;

        Ok(Self {
            base_url: std::env::var("GOOGLE_API_BASE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("GENAI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            upload_timeout: Duration::from_secs(
                std::env::var("GENAI_UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            thinking_budget: std::env::var("GENAI_THINKING_BUDGET")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_thinking_budget(mut self, budget: i32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    /// Base URL without a trailing slash.
    pub(crate) fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GenAiConfig::new("key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.thinking_budget.is_none());
    }

    #[test]
    fn test_base_trims_slash() {
        let config = GenAiConfig::new("key").with_base_url("http://proxy.local/");
        assert_eq!(config.base(), "http://proxy.local");
    }
}
