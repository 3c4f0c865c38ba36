//! Analysis result models.
//!
//! [`AnalysisRecord`] is the cached row keyed by asset id;
//! [`AnalysisOutcome`] is what a caller receives after a completed run.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Instruction used when the caller does not provide one.
pub const DEFAULT_VIDEO_PROMPT: &str = "请详细分析这个视频的内容";

/// Cached analysis result for one remote asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRecord {
    /// Locally generated unique identifier (UUID)
    pub record_id: String,

    /// Remote asset identifier, unique across records
    pub asset_id: String,

    /// Generated analysis text (markdown)
    pub content: Option<String>,

    /// When the record was first created
    pub created_at: DateTime<Utc>,

    /// When the content was last written
    pub updated_at: DateTime<Utc>,
}

/// Terminal status reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    #[default]
    Completed,
}

/// Result of a completed analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisOutcome {
    /// Generated analysis text
    pub analysis: String,

    /// Remote asset identifier
    pub file_id: String,

    /// Cache record that now holds the analysis
    pub record_id: String,

    pub status: OutcomeStatus,
}

impl AnalysisOutcome {
    /// Build an outcome from the record written to the cache.
    pub fn from_record(record: &AnalysisRecord, analysis: impl Into<String>) -> Self {
        Self {
            analysis: analysis.into(),
            file_id: record.asset_id.clone(),
            record_id: record.record_id.clone(),
            status: OutcomeStatus::Completed,
        }
    }
}

/// Failure categories surfaced by an analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Missing/empty asset, wrong media type or oversized payload
    InvalidInput,
    /// Remote processor reported a terminal failure
    ProcessingFailed,
    /// Remote processor did not finish within the polling bounds
    ProcessingTimeout,
    /// Generation succeeded but returned no usable text
    EmptyAnalysisResult,
    /// Result cache write failed
    PersistenceError,
    /// Network or transport failure talking to the processor
    UpstreamUnavailable,
    /// Local failure: staging disk, media tools
    #[serde(rename = "SERVER_ERROR")]
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::ProcessingFailed => "PROCESSING_FAILED",
            Self::ProcessingTimeout => "PROCESSING_TIMEOUT",
            Self::EmptyAnalysisResult => "EMPTY_ANALYSIS_RESULT",
            Self::PersistenceError => "PERSISTENCE_ERROR",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::Internal => "SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_record() {
        let now = Utc::now();
        let record = AnalysisRecord {
            record_id: "rec-1".to_string(),
            asset_id: "files/abc".to_string(),
            content: Some("A cat".to_string()),
            created_at: now,
            updated_at: now,
        };

        let outcome = AnalysisOutcome::from_record(&record, "A cat");
        assert_eq!(outcome.file_id, "files/abc");
        assert_eq!(outcome.record_id, "rec-1");
        assert_eq!(outcome.status, OutcomeStatus::Completed);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "COMPLETED");
    }

    #[test]
    fn test_error_kind_codes_match_serde() {
        for kind in [
            ErrorKind::InvalidInput,
            ErrorKind::ProcessingFailed,
            ErrorKind::ProcessingTimeout,
            ErrorKind::EmptyAnalysisResult,
            ErrorKind::PersistenceError,
            ErrorKind::UpstreamUnavailable,
            ErrorKind::Internal,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_code()));
        }
    }
}
