//! Capability traits for remote asset processing and generation.
//!
//! The orchestrator only talks to these traits, so the generation backend
//! can be swapped without touching the polling workflow.

use std::path::PathBuf;

use async_trait::async_trait;

use vsight_models::AssetHandle;

use crate::error::GenAiResult;

/// A local file ready to be submitted to the processor.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub path: PathBuf,
    pub mime_type: String,
    pub size: u64,
    pub display_name: Option<String>,
}

impl AssetUpload {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
            size,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// One part of a multimodal generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Raw bytes sent inline (e.g. JPEG frames)
    Inline { mime_type: String, data: Vec<u8> },
    /// Reference to an asset already held by the processor
    File { mime_type: String, uri: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn jpeg(data: Vec<u8>) -> Self {
        Self::Inline {
            mime_type: "image/jpeg".to_string(),
            data,
        }
    }
}

/// Remote service that ingests an asset, prepares it in the background and
/// answers instructions about it.
#[async_trait]
pub trait AssetProcessor: Send + Sync {
    /// Upload an asset; the returned handle is usually still pending.
    async fn submit(&self, upload: &AssetUpload) -> GenAiResult<AssetHandle>;

    /// Re-query the status of a submitted asset.
    async fn get_status(&self, handle_id: &str) -> GenAiResult<AssetHandle>;

    /// Ask about a ready asset. `None` means the response carried no text.
    async fn generate(&self, handle: &AssetHandle, instruction: &str) -> GenAiResult<Option<String>>;
}

/// Text generation over arbitrary content parts.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate text. `None` means the response carried no text.
    async fn generate_content(&self, parts: Vec<ContentPart>) -> GenAiResult<Option<String>>;
}
