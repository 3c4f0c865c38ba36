//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vsight_core::AnalysisError;
use vsight_models::ErrorKind;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::NotFound(_) => None,
            ApiError::BadRequest(_) => Some(ErrorKind::InvalidInput),
            ApiError::Analysis(e) => Some(e.kind()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.kind() {
            None => StatusCode::NOT_FOUND,
            Some(kind) => status_for(kind),
        }
    }
}

/// HTTP status for each analysis failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::ProcessingFailed
        | ErrorKind::EmptyAnalysisResult
        | ErrorKind::PersistenceError
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::ProcessingTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose storage or upstream internals in production
        let hide = matches!(
            self.kind(),
            Some(ErrorKind::PersistenceError | ErrorKind::UpstreamUnavailable | ErrorKind::Internal)
        );
        let detail = if hide
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            detail,
            code: self.kind().map(|k| k.as_code()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::ProcessingFailed), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::EmptyAnalysisResult), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::PersistenceError), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::ProcessingTimeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status_for(ErrorKind::UpstreamUnavailable), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_codes() {
        let err = ApiError::from(AnalysisError::EmptyAnalysisResult);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind().map(|k| k.as_code()), Some("EMPTY_ANALYSIS_RESULT"));

        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
    }
}
