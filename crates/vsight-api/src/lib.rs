//! Axum HTTP API server.
//!
//! This crate provides:
//! - Multipart video upload and analysis endpoint
//! - Cached analysis lookup by remote asset id
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
