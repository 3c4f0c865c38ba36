//! Gemini client error types.

use thiserror::Error;

/// Result type for Gemini operations.
pub type GenAiResult<T> = Result<T, GenAiError>;

/// Errors that can occur while talking to the Gemini API.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenAiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Classify a non-success HTTP response.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => Self::NotFound(body),
            429 => Self::RateLimited(body),
            500..=599 => Self::ServerError(status, body),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, body)),
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::ServerError(status, _) => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::ServerError(..)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_classification() {
        assert!(matches!(
            GenAiError::from_http_status(404, "missing"),
            GenAiError::NotFound(_)
        ));
        assert!(matches!(
            GenAiError::from_http_status(429, "slow down"),
            GenAiError::RateLimited(_)
        ));
        assert!(matches!(
            GenAiError::from_http_status(503, "unavailable"),
            GenAiError::ServerError(503, _)
        ));
        assert!(matches!(
            GenAiError::from_http_status(400, "bad"),
            GenAiError::RequestFailed(_)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(GenAiError::from_http_status(500, "").is_retryable());
        assert!(GenAiError::from_http_status(429, "").is_retryable());
        assert!(!GenAiError::from_http_status(403, "").is_retryable());
        assert!(!GenAiError::config("missing key").is_retryable());
    }

    #[test]
    fn test_http_status_getter() {
        assert_eq!(GenAiError::from_http_status(502, "").http_status(), Some(502));
        assert_eq!(GenAiError::NotFound("x".into()).http_status(), Some(404));
        assert_eq!(GenAiError::invalid_response("x").http_status(), None);
    }
}
