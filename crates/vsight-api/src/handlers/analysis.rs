//! Video analysis handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use tracing::info;

use vsight_core::AnalysisError;
use vsight_media::StagedAsset;
use vsight_models::{AnalysisOutcome, AnalysisRecord};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart form field carrying the video.
const FILE_FIELD: &str = "file";
/// Optional instruction field.
const PROMPT_FIELD: &str = "prompt";

struct Upload {
    asset: StagedAsset,
    content_type: Option<String>,
}

/// POST /api/video-analysis
///
/// Streams the `file` field to a staged temp file, then runs the
/// upload → poll → generate → cache workflow.
pub async fn create_analysis(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisOutcome>> {
    let mut upload: Option<Upload> = None;
    let mut prompt: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {}", e)))?
    {
        match field.name() {
            Some(FILE_FIELD) => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| ApiError::bad_request("No file selected"))?;

                let content_type = field.content_type().map(str::to_string);
                let prefix = &state.orchestrator.config().accepted_media_prefix;
                if !content_type.as_deref().is_some_and(|ct| ct.starts_with(prefix.as_str())) {
                    return Err(ApiError::bad_request(format!(
                        "Unsupported file type, expected {}*",
                        prefix
                    )));
                }

                let mut asset = state.orchestrator.stage(Some(&file_name)).await?;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?
                {
                    asset
                        .write_chunk(&chunk)
                        .await
                        .map_err(AnalysisError::from)?;
                }

                info!(file_name = %file_name, size = asset.size(), "Upload staged");
                upload = Some(Upload {
                    asset,
                    content_type,
                });
            }
            Some(PROMPT_FIELD) => {
                prompt = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Invalid prompt field: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("No video file was provided"))?;
    let outcome = state
        .orchestrator
        .analyze(
            upload.asset,
            upload.content_type.as_deref(),
            prompt.as_deref(),
        )
        .await?;

    Ok(Json(outcome))
}

/// GET /api/video-analysis/*file_id
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Json<AnalysisRecord>> {
    let file_id = file_id.trim_start_matches('/');

    state
        .orchestrator
        .cached(file_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No analysis for {}", file_id)))
}
