//! Analysis workflow errors.

use thiserror::Error;

use vsight_genai::GenAiError;
use vsight_media::MediaError;
use vsight_models::ErrorKind;
use vsight_store::StoreError;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Remote processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Remote processing did not finish after {attempts} status checks ({elapsed_secs}s)")]
    ProcessingTimeout { attempts: u32, elapsed_secs: u64 },

    #[error("Analysis returned no text")]
    EmptyAnalysisResult,

    #[error("Failed to persist analysis: {0}")]
    Persistence(#[from] StoreError),

    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] GenAiError),

    #[error("Media error: {0}")]
    Media(MediaError),
}

impl AnalysisError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn processing_failed(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }

    /// Caller-facing category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ProcessingFailed(_) => ErrorKind::ProcessingFailed,
            Self::Media(_) | Self::Upstream(GenAiError::Io(_)) => ErrorKind::Internal,
            Self::ProcessingTimeout { .. } => ErrorKind::ProcessingTimeout,
            Self::EmptyAnalysisResult => ErrorKind::EmptyAnalysisResult,
            Self::Persistence(_) => ErrorKind::PersistenceError,
            Self::Upstream(_) => ErrorKind::UpstreamUnavailable,
        }
    }
}

impl From<MediaError> for AnalysisError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::ResourceLimit(msg) => Self::InvalidInput(msg),
            other => Self::Media(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AnalysisError::from(GenAiError::from_http_status(503, "down")).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(
            AnalysisError::from(GenAiError::from_http_status(400, "bad")).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(
            AnalysisError::from(StoreError::invalid_asset_id("")).kind(),
            ErrorKind::PersistenceError
        );
        assert_eq!(
            AnalysisError::from(MediaError::resource_limit("too big")).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            AnalysisError::ProcessingTimeout {
                attempts: 3,
                elapsed_secs: 9
            }
            .kind(),
            ErrorKind::ProcessingTimeout
        );
    }

    #[test]
    fn test_local_failures_are_internal() {
        let io = || std::io::Error::new(std::io::ErrorKind::NotFound, "gone");

        assert_eq!(
            AnalysisError::from(MediaError::Io(io())).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            AnalysisError::from(MediaError::ToolNotFound("ffmpeg")).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            AnalysisError::from(GenAiError::Io(io())).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            AnalysisError::processing_failed("remote").kind(),
            ErrorKind::ProcessingFailed
        );
    }
}
