//! Gemini REST wire types.

use serde::{Deserialize, Serialize};

use vsight_models::{AssetHandle, AssetStatus};

/// generateContent request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on thought-summary parts when thinking is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThinkingConfig {
    pub thinking_budget: i32,
}

/// generateContent response body (also one SSE event of a stream).
#[derive(Debug, Deserialize, Default)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateResponse {
    /// Concatenated non-thought text of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter(|p| !p.thought.unwrap_or(false))
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Files API resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileResource {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Upload responses wrap the resource in `{"file": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct FileEnvelope {
    pub file: FileResource,
}

impl FileResource {
    pub fn status(&self) -> AssetStatus {
        match self.state.as_deref() {
            Some("ACTIVE") => AssetStatus::Ready,
            Some("FAILED") => AssetStatus::Failed,
            // PROCESSING, STATE_UNSPECIFIED or missing
            _ => AssetStatus::Pending,
        }
    }

    pub fn into_handle(self) -> AssetHandle {
        let status = self.status();
        let mut handle = AssetHandle::new(self.name, status);
        handle.uri = self.uri;
        handle.mime_type = self.mime_type;
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_state_mapping() {
        for (state, expected) in [
            (Some("PROCESSING"), AssetStatus::Pending),
            (Some("STATE_UNSPECIFIED"), AssetStatus::Pending),
            (None, AssetStatus::Pending),
            (Some("ACTIVE"), AssetStatus::Ready),
            (Some("FAILED"), AssetStatus::Failed),
        ] {
            let file = FileResource {
                name: "files/a".to_string(),
                uri: None,
                mime_type: None,
                state: state.map(str::to_string),
            };
            assert_eq!(file.status(), expected, "{:?}", state);
        }
    }

    #[test]
    fn test_response_text_skips_thoughts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "Hello, "},
                        {"text": "world"}
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.text(), "Hello, world");
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_part_serialization_is_camel_case() {
        let part = Part {
            file_data: Some(FileData {
                mime_type: "video/mp4".to_string(),
                file_uri: "https://x/files/a".to_string(),
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["fileData"]["fileUri"], "https://x/files/a");
        assert!(json.get("text").is_none());
    }
}
