//! Speech-to-text over a video's audio track.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Produces a transcript for a local media file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, media: &Path) -> MediaResult<String>;
}

/// Runs the `whisper` CLI and reads its plain-text output.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    pub binary: String,
    pub model: String,
    pub language: String,
    pub timeout: Duration,
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self {
            binary: "whisper".to_string(),
            model: "small".to_string(),
            language: "Chinese".to_string(),
            timeout: Duration::from_secs(1800),
        }
    }
}

impl WhisperCli {
    /// Read `WHISPER_MODEL` / `WHISPER_LANGUAGE` / `WHISPER_BIN`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            binary: std::env::var("WHISPER_BIN").unwrap_or(defaults.binary),
            model: std::env::var("WHISPER_MODEL").unwrap_or(defaults.model),
            language: std::env::var("WHISPER_LANGUAGE").unwrap_or(defaults.language),
            timeout: defaults.timeout,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_args(&self, media: &Path, output_dir: &Path) -> Vec<String> {
        vec![
            media.to_string_lossy().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--language".to_string(),
            self.language.clone(),
            "--fp16".to_string(),
            "False".to_string(),
            "--output_format".to_string(),
            "txt".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
        ]
    }
}

/// Whisper names its output after the input stem.
fn transcript_path(media: &Path, output_dir: &Path) -> PathBuf {
    let stem = media
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    output_dir.join(format!("{}.txt", stem))
}

#[async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(&self, media: &Path) -> MediaResult<String> {
        if !media.exists() {
            return Err(MediaError::FileNotFound(media.to_path_buf()));
        }
        which::which(&self.binary).map_err(|_| MediaError::ToolNotFound("whisper"))?;

        let output_dir = tempfile::Builder::new().prefix("vsight-whisper-").tempdir()?;
        let args = self.build_args(media, output_dir.path());
        debug!("Running Whisper: {} {}", self.binary, args.join(" "));

        let run = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Whisper timed out, killing process");
                return Err(MediaError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            return Err(MediaError::transcription_failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let text = tokio::fs::read_to_string(transcript_path(media, output_dir.path())).await?;
        let text = text.trim().to_string();
        info!(chars = text.chars().count(), model = %self.model, "Audio transcribed");
        Ok(text)
    }
}
