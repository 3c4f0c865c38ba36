//! Local media handling for vsight.
//!
//! This crate provides:
//! - Upload staging with guaranteed cleanup
//! - FFmpeg/FFprobe wrappers for probing and frame extraction
//! - Whisper CLI transcription behind the [`Transcriber`] trait

pub mod command;
pub mod error;
pub mod frames;
pub mod probe;
pub mod staged;
pub mod transcribe;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{extract_key_frames, FrameSet, KeyFrame, DEFAULT_FRAME_COUNT};
pub use probe::{get_duration, probe_video, VideoInfo};
pub use staged::StagedAsset;
pub use transcribe::{Transcriber, WhisperCli};
