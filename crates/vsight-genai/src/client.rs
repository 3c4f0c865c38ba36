//! Gemini API client.
//!
//! Implements the Files API resumable upload, file status lookups and
//! `generateContent` / `streamGenerateContent` calls.

use async_trait::async_trait;
use base64::Engine;
use futures_util::Stream;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, Response};
use tracing::{debug, info};

use vsight_models::AssetHandle;

use crate::config::GenAiConfig;
use crate::error::{GenAiError, GenAiResult};
use crate::processor::{AssetProcessor, AssetUpload, ContentGenerator, ContentPart};
use crate::stream::text_chunks;
use crate::types::{
    Content, FileData, FileEnvelope, FileResource, GenerateRequest, GenerateResponse,
    GenerationConfig, InlineData, Part, ThinkingConfig,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    config: GenAiConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GenAiConfig) -> GenAiResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self { config, client })
    }

    /// Create a client configured from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Self::new(GenAiConfig::from_env()?)
    }

    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    /// Use a different model for subsequent generation calls.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    fn model_url(&self, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.config.base(),
            self.config.model,
            method
        )
    }

    /// Upload a file with the resumable protocol (start, then upload+finalize).
    async fn upload_file(&self, upload: &AssetUpload) -> GenAiResult<FileResource> {
        let display_name = upload.display_name.clone().unwrap_or_else(|| {
            upload
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "asset".to_string())
        });

        // Open before starting the session so a missing file never opens one.
        let file = tokio::fs::File::open(&upload.path).await?;

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.config.base()))
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", upload.size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", &upload.mime_type)
            .timeout(self.config.request_timeout)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GenAiError::invalid_response("Upload session URL missing"))?;

        debug!(
            path = %upload.path.display(),
            size = upload.size,
            "Uploading media to Gemini"
        );

        let response = self
            .client
            .post(&upload_url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(CONTENT_LENGTH, upload.size)
            .timeout(self.config.upload_timeout)
            .body(Body::from(file))
            .send()
            .await?;
        let envelope: FileEnvelope = check_status(response).await?.json().await?;

        Ok(envelope.file)
    }

    async fn fetch_file(&self, name: &str) -> GenAiResult<FileResource> {
        let response = self
            .client
            .get(format!("{}/v1beta/{}", self.config.base(), name))
            .header(API_KEY_HEADER, &self.config.api_key)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    fn build_request(&self, parts: Vec<ContentPart>) -> GenerateRequest {
        let parts = parts
            .into_iter()
            .map(|part| match part {
                ContentPart::Text(text) => Part {
                    text: Some(text),
                    ..Default::default()
                },
                ContentPart::Inline { mime_type, data } => Part {
                    inline_data: Some(InlineData {
                        mime_type,
                        data: base64::engine::general_purpose::STANDARD.encode(data),
                    }),
                    ..Default::default()
                },
                ContentPart::File { mime_type, uri } => Part {
                    file_data: Some(FileData {
                        mime_type,
                        file_uri: uri,
                    }),
                    ..Default::default()
                },
            })
            .collect();

        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: self.config.thinking_budget.map(|budget| GenerationConfig {
                thinking_config: ThinkingConfig {
                    thinking_budget: budget,
                },
            }),
        }
    }

    /// Single-shot generation over arbitrary parts.
    pub async fn generate_parts(&self, parts: Vec<ContentPart>) -> GenAiResult<Option<String>> {
        let request = self.build_request(parts);

        info!(model = %self.config.model, "Calling Gemini generateContent");
        let response = self
            .client
            .post(self.model_url("generateContent"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await?;

        let response: GenerateResponse = check_status(response).await?.json().await?;
        let text = response.text();

        Ok((!text.trim().is_empty()).then_some(text))
    }

    /// Generate from a plain text prompt.
    pub async fn generate_text(&self, prompt: &str) -> GenAiResult<Option<String>> {
        self.generate_parts(vec![ContentPart::text(prompt)]).await
    }

    /// Streaming generation; yields text chunks as they arrive.
    pub async fn generate_stream(
        &self,
        parts: Vec<ContentPart>,
    ) -> GenAiResult<impl Stream<Item = GenAiResult<String>> + Send> {
        let request = self.build_request(parts);

        info!(model = %self.config.model, "Calling Gemini streamGenerateContent");
        let response = self
            .client
            .post(self.model_url("streamGenerateContent"))
            .query(&[("alt", "sse")])
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        Ok(text_chunks(check_status(response).await?.bytes_stream()))
    }
}

/// Turn non-success responses into classified errors.
async fn check_status(response: Response) -> GenAiResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(GenAiError::from_http_status(status, body))
}

#[async_trait]
impl AssetProcessor for GeminiClient {
    async fn submit(&self, upload: &AssetUpload) -> GenAiResult<AssetHandle> {
        let file = self.upload_file(upload).await?;
        let mut handle = file.into_handle();
        if handle.mime_type.is_none() {
            handle.mime_type = Some(upload.mime_type.clone());
        }

        info!(asset_id = %handle.id, status = %handle.status, "Asset uploaded to Gemini");
        Ok(handle)
    }

    async fn get_status(&self, handle_id: &str) -> GenAiResult<AssetHandle> {
        let handle = self.fetch_file(handle_id).await?.into_handle();
        debug!(asset_id = %handle.id, status = %handle.status, "Fetched asset status");
        Ok(handle)
    }

    async fn generate(&self, handle: &AssetHandle, instruction: &str) -> GenAiResult<Option<String>> {
        let uri = handle
            .uri
            .clone()
            .unwrap_or_else(|| format!("{}/v1beta/{}", self.config.base(), handle.id));
        let mime_type = handle
            .mime_type
            .clone()
            .unwrap_or_else(|| "video/mp4".to_string());

        self.generate_parts(vec![
            ContentPart::File { mime_type, uri },
            ContentPart::text(instruction),
        ])
        .await
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(&self, parts: Vec<ContentPart>) -> GenAiResult<Option<String>> {
        self.generate_parts(parts).await
    }
}
