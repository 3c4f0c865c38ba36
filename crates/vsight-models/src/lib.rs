//! Shared data models for the vsight backend.
//!
//! This crate provides Serde-serializable types for:
//! - Remote asset handles and their processing status
//! - Cached analysis records and request outcomes
//! - Error kinds exposed to API and CLI callers
//! - Short-video platform links and their metadata

pub mod analysis;
pub mod asset;
pub mod link;
pub mod metadata;

// Re-export common types
pub use analysis::{AnalysisOutcome, AnalysisRecord, ErrorKind, OutcomeStatus, DEFAULT_VIDEO_PROMPT};
pub use asset::{AssetHandle, AssetStatus};
pub use link::{LinkError, LinkResult, Platform, VideoLink};
pub use metadata::VideoMetadata;
