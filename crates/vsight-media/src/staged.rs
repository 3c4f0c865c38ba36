//! Local staging of uploaded media.
//!
//! A [`StagedAsset`] is a uniquely named temp file inside the upload folder.
//! It is removed when dropped, so every exit path of a request cleans up.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Longest extension kept from a client-supplied filename.
const MAX_EXTENSION_LEN: usize = 8;

/// A staged upload on local disk.
#[derive(Debug)]
pub struct StagedAsset {
    file: NamedTempFile,
    writer: Option<tokio::fs::File>,
    original_name: Option<String>,
    size: u64,
    max_size: Option<u64>,
}

impl StagedAsset {
    /// Create an empty staged file in `dir` (created if missing).
    ///
    /// Only a sanitized extension of `original_name` reaches the filesystem.
    pub async fn create(dir: impl AsRef<Path>, original_name: Option<&str>) -> MediaResult<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let suffix = original_name
            .and_then(safe_extension)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        let writer = tokio::fs::File::from_std(file.reopen()?);

        debug!(path = %file.path().display(), "Staged upload file created");
        Ok(Self {
            file,
            writer: Some(writer),
            original_name: original_name.map(str::to_string),
            size: 0,
            max_size: None,
        })
    }

    /// Stage `bytes` in one call.
    pub async fn from_bytes(
        dir: impl AsRef<Path>,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> MediaResult<Self> {
        let mut staged = Self::create(dir, original_name).await?;
        staged.write_chunk(bytes).await?;
        staged.finish().await?;
        Ok(staged)
    }

    /// Reject writes that would grow the file past `max` bytes.
    pub fn with_max_size(mut self, max: u64) -> Self {
        self.max_size = Some(max);
        self
    }

    /// Append a chunk, enforcing the size limit.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> MediaResult<()> {
        let new_size = self.size + chunk.len() as u64;
        if let Some(max) = self.max_size {
            if new_size > max {
                return Err(MediaError::resource_limit(format!(
                    "upload exceeds {} bytes",
                    max
                )));
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("staged asset already finished"))?;
        writer.write_all(chunk).await?;
        self.size = new_size;
        Ok(())
    }

    /// Flush and close the writer. Further writes fail.
    pub async fn finish(&mut self) -> MediaResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            writer.sync_all().await?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Client-supplied filename, unsanitized. Only for display purposes.
    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// Name to show the remote processor.
    pub fn display_name(&self) -> String {
        self.original_name
            .clone()
            .unwrap_or_else(|| file_name(self.path()))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Lowercased ASCII-alphanumeric extension, if any.
fn safe_extension(name: &str) -> Option<String> {
    let ext = PathBuf::from(name)
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase();
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}
