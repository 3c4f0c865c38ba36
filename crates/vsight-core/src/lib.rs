//! Video analysis workflow.
//!
//! This crate provides:
//! - [`AnalysisOrchestrator`]: stage → submit → poll → generate → cache
//! - [`PollPolicy`] and [`AnalysisConfig`] loaded from the environment
//! - [`ViralAnalyzer`]: link + key frames + transcript analysis
//! - Tracing setup shared by the binaries

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod viral;

pub use config::{AnalysisConfig, PollPolicy};
pub use error::{AnalysisError, AnalysisResult};
pub use orchestrator::AnalysisOrchestrator;
pub use viral::{build_viral_prompt, ViralAnalyzer, ViralReport};
