//! Engagement metadata for a short video.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Public metadata of a platform video, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub share_count: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
    /// Publish date as shown by the platform (e.g. `2026-01-05`)
    #[serde(default)]
    pub publish_time: Option<String>,
}

impl VideoMetadata {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set like, comment and share counts.
    pub fn with_engagement(mut self, likes: u64, comments: u64, shares: u64) -> Self {
        self.like_count = Some(likes);
        self.comment_count = Some(comments);
        self.share_count = Some(shares);
        self
    }
}
