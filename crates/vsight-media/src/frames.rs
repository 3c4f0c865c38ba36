//! Uniformly sampled key frames.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::get_duration;

/// Frames sampled when the caller does not choose.
pub const DEFAULT_FRAME_COUNT: usize = 5;

const FRAME_TIMEOUT_SECS: u64 = 60;

/// One extracted JPEG frame.
#[derive(Debug, Clone)]
pub struct KeyFrame {
    pub index: usize,
    /// Position in the source video, seconds
    pub timestamp: f64,
    pub path: PathBuf,
}

/// Extracted frames living in a private temp directory.
///
/// The directory and every frame in it are removed when the set is dropped.
#[derive(Debug)]
pub struct FrameSet {
    dir: TempDir,
    frames: Vec<KeyFrame>,
}

impl FrameSet {
    pub fn frames(&self) -> &[KeyFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Read every frame as raw JPEG bytes, in order.
    pub async fn read_all(&self) -> MediaResult<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            out.push(tokio::fs::read(&frame.path).await?);
        }
        Ok(out)
    }
}

/// Sample timestamps `i * duration / count` for `i in 0..count`.
pub fn sample_timestamps(duration: f64, count: usize) -> Vec<f64> {
    if count == 0 || !duration.is_finite() || duration <= 0.0 {
        return Vec::new();
    }
    let interval = duration / count as f64;
    (0..count).map(|i| i as f64 * interval).collect()
}

/// Extract `count` uniformly spaced frames from `video` as JPEG files.
pub async fn extract_key_frames(video: impl AsRef<Path>, count: usize) -> MediaResult<FrameSet> {
    let video = video.as_ref();
    let duration = get_duration(video).await?;

    let timestamps = sample_timestamps(duration, count);
    if timestamps.is_empty() {
        return Err(MediaError::InvalidVideo(format!(
            "cannot sample {} frames from a {:.2}s video",
            count, duration
        )));
    }

    let dir = tempfile::Builder::new().prefix("vsight-frames-").tempdir()?;
    let runner = FfmpegRunner::new().with_timeout(FRAME_TIMEOUT_SECS);
    let mut frames = Vec::with_capacity(timestamps.len());

    for (index, timestamp) in timestamps.into_iter().enumerate() {
        let path = dir.path().join(format!("frame_{}.jpg", index));
        let cmd = FfmpegCommand::new(video, &path)
            .seek(timestamp)
            .single_frame()
            .jpeg_quality(2);
        runner.run(&cmd).await?;

        debug!(index, timestamp, "Extracted key frame");
        frames.push(KeyFrame {
            index,
            timestamp,
            path,
        });
    }

    info!(count = frames.len(), duration, "Key frames extracted");
    Ok(FrameSet { dir, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_timestamps() {
        let ts = sample_timestamps(10.0, 5);
        assert_eq!(ts, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_timestamps_degenerate_inputs() {
        assert!(sample_timestamps(10.0, 0).is_empty());
        assert!(sample_timestamps(0.0, 5).is_empty());
        assert!(sample_timestamps(f64::NAN, 5).is_empty());
    }

    #[tokio::test]
    async fn test_frame_set_cleans_up_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let frame_path = dir.path().join("frame_0.jpg");
        std::fs::write(&frame_path, [0xFF, 0xD8, 0xFF]).unwrap();
        let root = dir.path().to_path_buf();

        let set = FrameSet {
            dir,
            frames: vec![KeyFrame {
                index: 0,
                timestamp: 0.0,
                path: frame_path,
            }],
        };
        assert_eq!(set.read_all().await.unwrap(), vec![vec![0xFF, 0xD8, 0xFF]]);

        drop(set);
        assert!(!root.exists());
    }
}
