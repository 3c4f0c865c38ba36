//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::analysis::{create_analysis, get_analysis};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Room for multipart boundaries and the prompt field on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let body_limit =
        state.orchestrator.config().max_asset_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    let api_routes = Router::new()
        .route("/video-analysis", post(create_analysis))
        .route("/video-analysis/*file_id", get(get_analysis))
        .layer(DefaultBodyLimit::max(body_limit));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use vsight_core::{AnalysisConfig, AnalysisOrchestrator, PollPolicy};
    use vsight_genai::{AssetProcessor, AssetUpload, GenAiResult};
    use vsight_models::{AssetHandle, AssetStatus};
    use vsight_store::SqliteAnalysisStore;

    use super::*;
    use crate::config::ApiConfig;

    const BOUNDARY: &str = "vsight-test-boundary";

    struct FixedProcessor {
        status: AssetStatus,
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl AssetProcessor for FixedProcessor {
        async fn submit(&self, _upload: &AssetUpload) -> GenAiResult<AssetHandle> {
            Ok(AssetHandle::new("files/abc123", AssetStatus::Pending))
        }

        async fn get_status(&self, handle_id: &str) -> GenAiResult<AssetHandle> {
            Ok(AssetHandle::new(handle_id, self.status))
        }

        async fn generate(&self, _handle: &AssetHandle, _instruction: &str) -> GenAiResult<Option<String>> {
            Ok(self.reply.map(str::to_string))
        }
    }

    async fn app(status: AssetStatus, reply: Option<&'static str>, max_bytes: u64) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteAnalysisStore::in_memory().await.unwrap();
        let config = AnalysisConfig::default()
            .with_upload_dir(dir.path())
            .with_max_asset_bytes(max_bytes)
            .with_poll(PollPolicy {
                interval: Duration::from_millis(1),
                max_attempts: 10,
                timeout: Duration::from_secs(5),
            });
        let orchestrator = AnalysisOrchestrator::new(
            Arc::new(FixedProcessor { status, reply }),
            Arc::new(store.clone()),
            config,
        );
        let state = AppState::from_parts(ApiConfig::default(), orchestrator, store);
        (create_router(state, None), dir)
    }

    fn multipart_request(file: Option<(&str, &str, &[u8])>, prompt: Option<&str>) -> Request<Body> {
        let mut body = Vec::new();
        if let Some((name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(prompt) = prompt {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"prompt\"\r\n\r\n{prompt}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/video-analysis")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn staged_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_analysis_success_then_cached_lookup() {
        let (app, dir) = app(AssetStatus::Ready, Some("A cat playing piano"), 1024).await;

        let response = app
            .clone()
            .oneshot(multipart_request(
                Some(("cat.mp4", "video/mp4", b"video-bytes")),
                Some("What happens?"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["analysis"], "A cat playing piano");
        assert_eq!(body["file_id"], "files/abc123");
        assert_eq!(body["status"], "COMPLETED");
        assert_eq!(staged_files(&dir), 0);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/video-analysis/files/abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["content"], "A cat playing piano");
        assert_eq!(body["asset_id"], "files/abc123");
    }

    #[tokio::test]
    async fn test_rejects_non_video_upload() {
        let (app, _dir) = app(AssetStatus::Ready, Some("x"), 1024).await;

        let response = app
            .oneshot(multipart_request(Some(("a.png", "image/png", b"png")), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_rejects_missing_file() {
        let (app, _dir) = app(AssetStatus::Ready, Some("x"), 1024).await;

        let response = app
            .oneshot(multipart_request(None, Some("prompt only")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_rejects_oversized_upload() {
        let (app, dir) = app(AssetStatus::Ready, Some("x"), 8).await;

        let response = app
            .oneshot(multipart_request(Some(("big.mp4", "video/mp4", &[0u8; 9])), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_INPUT");
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_processing_failure_is_500() {
        let (app, dir) = app(AssetStatus::Failed, Some("x"), 1024).await;

        let response = app
            .oneshot(multipart_request(Some(("a.mp4", "video/mp4", b"v")), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["code"], "PROCESSING_FAILED");
        assert_eq!(staged_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_empty_analysis_is_500() {
        let (app, _dir) = app(AssetStatus::Ready, Some(""), 1024).await;

        let response = app
            .oneshot(multipart_request(Some(("a.mp4", "video/mp4", b"v")), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["code"], "EMPTY_ANALYSIS_RESULT");
    }

    #[tokio::test]
    async fn test_unknown_analysis_is_404() {
        let (app, _dir) = app(AssetStatus::Ready, Some("x"), 1024).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/video-analysis/files/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let (app, _dir) = app(AssetStatus::Ready, Some("x"), 1024).await;

        for uri in ["/health", "/healthz", "/ready"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            assert!(response.headers().contains_key("x-request-id"));
        }
    }
}
