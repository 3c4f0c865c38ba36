//! Gemini REST client for vsight.
//!
//! Provides:
//! - Resumable media upload through the Files API
//! - File status lookups used by the polling workflow
//! - Single-shot and streaming content generation
//! - The [`AssetProcessor`] and [`ContentGenerator`] seams the core crate drives

pub mod client;
pub mod config;
pub mod error;
pub mod processor;
mod stream;
mod types;

pub use client::GeminiClient;
pub use config::{GenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{GenAiError, GenAiResult};
pub use processor::{AssetProcessor, AssetUpload, ContentGenerator, ContentPart};
