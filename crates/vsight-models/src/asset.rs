//! Remote asset handles.
//!
//! An [`AssetHandle`] is the processor-side reference to an uploaded video.
//! Its status only changes by re-querying the processor, and stays fixed
//! once it reaches a terminal state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Processing status of a submitted asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    /// Remote preparation still running
    #[default]
    Pending,
    /// Asset can be referenced by generation requests
    Ready,
    /// Remote preparation failed
    Failed,
}

impl AssetStatus {
    /// Returns the status as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
        }
    }

    /// Returns true if no further status changes are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier and status of an asset held by the remote processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssetHandle {
    /// Processor-assigned identifier (e.g. `files/abc123`)
    pub id: String,

    /// Current processing status
    pub status: AssetStatus,

    /// URI used to reference the asset in generation requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Media type recorded by the processor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl AssetHandle {
    /// Create a handle with no URI or media type.
    pub fn new(id: impl Into<String>, status: AssetStatus) -> Self {
        Self {
            id: id.into(),
            status,
            uri: None,
            mime_type: None,
        }
    }

    /// Set the generation URI.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the media type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn is_ready(&self) -> bool {
        self.status == AssetStatus::Ready
    }

    pub fn is_pending(&self) -> bool {
        self.status == AssetStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!AssetStatus::Pending.is_terminal());
        assert!(AssetStatus::Ready.is_terminal());
        assert!(AssetStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&AssetStatus::Ready).unwrap();
        assert_eq!(json, "\"READY\"");
    }

    #[test]
    fn test_handle_builder() {
        let handle = AssetHandle::new("files/abc", AssetStatus::Pending)
            .with_uri("https://example.com/files/abc")
            .with_mime_type("video/mp4");

        assert!(handle.is_pending());
        assert!(!handle.is_ready());
        assert_eq!(handle.mime_type.as_deref(), Some("video/mp4"));
    }
}
