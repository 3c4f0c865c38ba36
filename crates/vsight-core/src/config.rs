//! Orchestrator configuration.

use std::path::PathBuf;
use std::time::Duration;

use vsight_models::DEFAULT_VIDEO_PROMPT;

/// Bounds on waiting for remote asset preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between status queries
    pub interval: Duration,
    /// Maximum number of status re-queries
    pub max_attempts: u32,
    /// Wall-clock limit for the whole polling phase
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 200,
            timeout: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval: Duration::from_secs(env_parse("POLL_INTERVAL_SECS", defaults.interval.as_secs())),
            max_attempts: env_parse("POLL_MAX_ATTEMPTS", defaults.max_attempts),
            timeout: Duration::from_secs(env_parse("POLL_TIMEOUT_SECS", defaults.timeout.as_secs())),
        }
    }
}

/// Analysis workflow configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub poll: PollPolicy,
    /// Largest accepted asset, in bytes
    pub max_asset_bytes: u64,
    /// Instruction used when the caller sends none
    pub default_prompt: String,
    /// Required media type prefix
    pub accepted_media_prefix: String,
    /// Directory where uploads are staged
    pub upload_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            max_asset_bytes: 200 * 1024 * 1024,
            default_prompt: DEFAULT_VIDEO_PROMPT.to_string(),
            accepted_media_prefix: "video/".to_string(),
            upload_dir: PathBuf::from("/tmp/vsight/uploads").join("videos"),
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll: PollPolicy::from_env(),
            max_asset_bytes: env_parse("MAX_ASSET_BYTES", defaults.max_asset_bytes),
            default_prompt: std::env::var("DEFAULT_PROMPT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_prompt),
            accepted_media_prefix: std::env::var("ACCEPTED_MEDIA_PREFIX")
                .unwrap_or(defaults.accepted_media_prefix),
            upload_dir: std::env::var("UPLOAD_FOLDER")
                .map(|dir| PathBuf::from(dir).join("videos"))
                .unwrap_or(defaults.upload_dir),
        }
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_max_asset_bytes(mut self, max: u64) -> Self {
        self.max_asset_bytes = max;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_asset_bytes, 209_715_200);
        assert_eq!(config.poll.interval, Duration::from_secs(3));
        assert_eq!(config.accepted_media_prefix, "video/");
        assert_eq!(config.default_prompt, DEFAULT_VIDEO_PROMPT);
        assert!(config.upload_dir.ends_with("videos"));
    }
}
