//! Short-video platform link parsing.
//!
//! Supported link shapes:
//! - Douyin / TikTok: `https://www.douyin.com/video/7570329176536845618`,
//!   `https://v.douyin.com/share/7570329176536845618?from=...`
//! - Kuaishou: `https://www.kuaishou.com/short-video/3xabc123`
//! - YouTube: `watch?v=`, `youtu.be/`, `/embed/`, `/v/`, `/shorts/`

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing a platform link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Not a valid http(s) URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported platform link: {0}")]
    UnsupportedPlatform(String),

    #[error("Could not find a video id in {platform} link")]
    MissingVideoId { platform: Platform },

    #[error("Video id has invalid format")]
    InvalidVideoId,
}

/// Result type for link parsing.
pub type LinkResult<T> = Result<T, LinkError>;

/// Short-video platform a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Douyin,
    Kuaishou,
    Youtube,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Douyin => "douyin",
            Self::Kuaishou => "kuaishou",
            Self::Youtube => "youtube",
        }
    }

    /// Detect the platform from a link's text.
    pub fn detect(link: &str) -> LinkResult<Self> {
        let lower = link.to_ascii_lowercase();
        if lower.contains("douyin") || lower.contains("tiktok") {
            Ok(Self::Douyin)
        } else if lower.contains("kuaishou") {
            Ok(Self::Kuaishou)
        } else if lower.contains("youtube.com") || lower.contains("youtu.be") {
            Ok(Self::Youtube)
        } else {
            Err(LinkError::UnsupportedPlatform(link.to_string()))
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed platform link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoLink {
    pub url: String,
    pub platform: Platform,
    /// Platform video id, when the link shape carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl VideoLink {
    /// Parse a link, detecting its platform and extracting the video id.
    ///
    /// Douyin links must carry a numeric id; other platforms keep `video_id`
    /// empty when the link shape is not recognised.
    pub fn parse(link: &str) -> LinkResult<Self> {
        let link = link.trim();

        let parsed = url::Url::parse(link).map_err(|_| LinkError::InvalidUrl(link.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LinkError::InvalidUrl(link.to_string()));
        }

        let platform = Platform::detect(link)?;
        let video_id = match platform {
            Platform::Douyin => Some(
                extract_douyin_id(link).ok_or(LinkError::MissingVideoId { platform })?,
            ),
            Platform::Kuaishou => extract_after(link, "/short-video/"),
            Platform::Youtube => Some(extract_youtube_id(link)?),
        };

        Ok(Self {
            url: link.to_string(),
            platform,
            video_id,
        })
    }
}

/// Digits after `video/`, or a digit-only path segment directly followed by `?`.
fn extract_douyin_id(link: &str) -> Option<String> {
    if let Some(pos) = link.find("video/") {
        let digits = leading_digits(&link[pos + "video/".len()..]);
        if !digits.is_empty() {
            return Some(digits.to_string());
        }
    }

    link.match_indices('/').find_map(|(pos, _)| {
        let rest = &link[pos + 1..];
        let digits = leading_digits(rest);
        (!digits.is_empty() && rest[digits.len()..].starts_with('?')).then(|| digits.to_string())
    })
}

fn leading_digits(s: &str) -> &str {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}

/// Segment following `marker`, cut at the first delimiter.
fn extract_after(link: &str, marker: &str) -> Option<String> {
    let start = link.find(marker)? + marker.len();
    let segment = &link[start..];
    let end = segment
        .find(|c| ['&', '#', '?', '/'].contains(&c))
        .unwrap_or(segment.len());
    let id = segment[..end].trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Extract the 11-character YouTube video id.
fn extract_youtube_id(link: &str) -> LinkResult<String> {
    let id = extract_after(link, "?v=")
        .or_else(|| extract_after(link, "&v="))
        .or_else(|| extract_after(link, "youtu.be/"))
        .or_else(|| extract_after(link, "/embed/"))
        .or_else(|| extract_after(link, "/v/"))
        .or_else(|| extract_after(link, "/shorts/"))
        .ok_or(LinkError::MissingVideoId {
            platform: Platform::Youtube,
        })?;

    if id.len() != 11 || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(LinkError::InvalidVideoId);
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_douyin_long_link() {
        let link = VideoLink::parse("https://www.douyin.com/video/7570329176536845618").unwrap();
        assert_eq!(link.platform, Platform::Douyin);
        assert_eq!(link.video_id.as_deref(), Some("7570329176536845618"));
    }

    #[test]
    fn test_douyin_short_link_with_query() {
        let link = VideoLink::parse("https://v.douyin.com/share/7570329176536845618?from=web").unwrap();
        assert_eq!(link.video_id.as_deref(), Some("7570329176536845618"));
    }

    #[test]
    fn test_tiktok_is_douyin() {
        let link = VideoLink::parse("https://www.tiktok.com/@user/video/7300000000000000001").unwrap();
        assert_eq!(link.platform, Platform::Douyin);
        assert_eq!(link.video_id.as_deref(), Some("7300000000000000001"));
    }

    #[test]
    fn test_douyin_without_id_fails() {
        let err = VideoLink::parse("https://www.douyin.com/discover").unwrap_err();
        assert_eq!(
            err,
            LinkError::MissingVideoId {
                platform: Platform::Douyin
            }
        );
    }

    #[test]
    fn test_kuaishou_link() {
        let link = VideoLink::parse("https://www.kuaishou.com/short-video/3xk9abc?authorId=1").unwrap();
        assert_eq!(link.platform, Platform::Kuaishou);
        assert_eq!(link.video_id.as_deref(), Some("3xk9abc"));

        let bare = VideoLink::parse("https://www.kuaishou.com/profile/abc").unwrap();
        assert_eq!(bare.video_id, None);
    }

    #[test]
    fn test_youtube_forms() {
        for url in [
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            let link = VideoLink::parse(url).unwrap();
            assert_eq!(link.platform, Platform::Youtube, "{url}");
            assert_eq!(link.video_id.as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn test_youtube_bad_id() {
        assert_eq!(
            VideoLink::parse("https://youtube.com/watch?v=short").unwrap_err(),
            LinkError::InvalidVideoId
        );
    }

    #[test]
    fn test_unsupported_and_invalid() {
        assert!(matches!(
            VideoLink::parse("https://vimeo.com/123"),
            Err(LinkError::UnsupportedPlatform(_))
        ));
        assert!(matches!(
            VideoLink::parse("not a url"),
            Err(LinkError::InvalidUrl(_))
        ));
        assert!(matches!(
            VideoLink::parse("ftp://douyin.com/video/1"),
            Err(LinkError::InvalidUrl(_))
        ));
    }
}
