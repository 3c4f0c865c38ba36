//! Upload → poll → generate → persist workflow.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use vsight_genai::{AssetProcessor, AssetUpload};
use vsight_media::StagedAsset;
use vsight_models::{AnalysisOutcome, AnalysisRecord, AssetHandle, AssetStatus};
use vsight_store::ResultCache;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::metrics;

/// Drives one analysis request from a staged upload to a cached result.
///
/// Each call to [`analyze`](Self::analyze) is independent; the orchestrator
/// itself holds no per-request state and can be shared behind an `Arc`.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    processor: Arc<dyn AssetProcessor>,
    cache: Arc<dyn ResultCache>,
    config: AnalysisConfig,
}

impl AnalysisOrchestrator {
    pub fn new(
        processor: Arc<dyn AssetProcessor>,
        cache: Arc<dyn ResultCache>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            processor,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Create an empty staged file in the upload folder, capped at the max asset size.
    pub async fn stage(&self, original_name: Option<&str>) -> AnalysisResult<StagedAsset> {
        let asset = StagedAsset::create(&self.config.upload_dir, original_name).await?;
        Ok(asset.with_max_size(self.config.max_asset_bytes))
    }

    /// Stage in-memory bytes and analyze them.
    pub async fn analyze_bytes(
        &self,
        bytes: &[u8],
        original_name: Option<&str>,
        media_type: Option<&str>,
        instruction: Option<&str>,
    ) -> AnalysisResult<AnalysisOutcome> {
        if bytes.len() as u64 > self.config.max_asset_bytes {
            return Err(self.too_large(bytes.len() as u64));
        }

        let asset = StagedAsset::from_bytes(&self.config.upload_dir, original_name, bytes).await?;
        self.analyze(asset, media_type, instruction).await
    }

    /// Analyze a staged asset.
    ///
    /// The asset is consumed and its file removed before this returns, on
    /// success and on every error. The cache is written only after a
    /// non-empty analysis was produced, so a dropped future never writes.
    pub async fn analyze(
        &self,
        mut asset: StagedAsset,
        media_type: Option<&str>,
        instruction: Option<&str>,
    ) -> AnalysisResult<AnalysisOutcome> {
        let started = Instant::now();
        let result = self.run(&mut asset, media_type, instruction).await;
        drop(asset);

        let elapsed = started.elapsed().as_secs_f64();
        metrics::record_outcome(result.as_ref().err().map(AnalysisError::kind), elapsed);
        match &result {
            Ok(outcome) => info!(
                asset_id = %outcome.file_id,
                record_id = %outcome.record_id,
                elapsed_secs = elapsed,
                "Analysis completed"
            ),
            Err(e) => warn!(kind = %e.kind(), error = %e, "Analysis failed"),
        }

        result
    }

    /// Cached analysis for a remote asset id.
    pub async fn cached(&self, asset_id: &str) -> AnalysisResult<Option<AnalysisRecord>> {
        Ok(self.cache.get_by_asset_id(asset_id).await?)
    }

    async fn run(
        &self,
        asset: &mut StagedAsset,
        media_type: Option<&str>,
        instruction: Option<&str>,
    ) -> AnalysisResult<AnalysisOutcome> {
        let media_type = self.validate(asset, media_type)?;
        asset.finish().await?;
        let instruction = self.resolve_instruction(instruction);

        let upload = AssetUpload::new(asset.path(), media_type, asset.size())
            .with_display_name(asset.display_name());
        let handle = self.processor.submit(&upload).await?;
        info!(
            asset_id = %handle.id,
            status = %handle.status,
            size = asset.size(),
            "Asset submitted"
        );

        let handle = self.wait_until_ready(handle).await?;

        let analysis = self
            .processor
            .generate(&handle, &instruction)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or(AnalysisError::EmptyAnalysisResult)?;

        let record = self.cache.upsert(&handle.id, &analysis).await?;
        Ok(AnalysisOutcome::from_record(&record, analysis))
    }

    fn validate<'a>(
        &self,
        asset: &StagedAsset,
        media_type: Option<&'a str>,
    ) -> AnalysisResult<&'a str> {
        if asset.is_empty() {
            return Err(AnalysisError::invalid_input("no video file was provided"));
        }
        if asset.size() > self.config.max_asset_bytes {
            return Err(self.too_large(asset.size()));
        }

        match media_type {
            Some(mt) if mt.starts_with(&self.config.accepted_media_prefix) => Ok(mt),
            Some(mt) => Err(AnalysisError::invalid_input(format!(
                "unsupported media type '{}', expected {}*",
                mt, self.config.accepted_media_prefix
            ))),
            None => Err(AnalysisError::invalid_input("media type is missing")),
        }
    }

    fn too_large(&self, size: u64) -> AnalysisError {
        AnalysisError::invalid_input(format!(
            "file is {} bytes, limit is {} bytes",
            size, self.config.max_asset_bytes
        ))
    }

    fn resolve_instruction(&self, instruction: Option<&str>) -> String {
        instruction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.config.default_prompt.as_str())
            .to_string()
    }

    /// Poll until the asset is READY, bounded by attempts and wall-clock time.
    async fn wait_until_ready(&self, handle: AssetHandle) -> AnalysisResult<AssetHandle> {
        let policy = self.config.poll;
        let started = Instant::now();
        let mut attempts = 0u32;

        let result = tokio::time::timeout(
            policy.timeout,
            self.poll_until_terminal(handle, &mut attempts, started),
        )
        .await;

        match result {
            Ok(result) => {
                metrics::record_poll_attempts(attempts);
                result
            }
            Err(_) => {
                metrics::record_poll_attempts(attempts);
                Err(AnalysisError::ProcessingTimeout {
                    attempts,
                    elapsed_secs: started.elapsed().as_secs(),
                })
            }
        }
    }

    async fn poll_until_terminal(
        &self,
        mut handle: AssetHandle,
        attempts: &mut u32,
        started: Instant,
    ) -> AnalysisResult<AssetHandle> {
        let policy = self.config.poll;

        loop {
            match handle.status {
                AssetStatus::Ready => return Ok(handle),
                AssetStatus::Failed => {
                    return Err(AnalysisError::processing_failed(format!(
                        "asset {} failed remote processing",
                        handle.id
                    )))
                }
                AssetStatus::Pending => {}
            }

            if *attempts >= policy.max_attempts {
                return Err(AnalysisError::ProcessingTimeout {
                    attempts: *attempts,
                    elapsed_secs: started.elapsed().as_secs(),
                });
            }

            tokio::time::sleep(policy.interval).await;
            *attempts += 1;

            let mut next = self.processor.get_status(&handle.id).await?;
            if next.uri.is_none() {
                next.uri = handle.uri.take();
            }
            if next.mime_type.is_none() {
                next.mime_type = handle.mime_type.take();
            }
            handle = next;

            debug!(
                asset_id = %handle.id,
                attempt = *attempts,
                status = %handle.status,
                "Polled asset status"
            );
        }
    }
}
