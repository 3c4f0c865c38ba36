//! Viral short-video analysis pipeline.
//!
//! Stages pass values forward: a parsed [`VideoLink`], sampled key frames,
//! an audio transcript, a prompt, and finally the model's report.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use vsight_genai::{ContentGenerator, ContentPart};
use vsight_media::{extract_key_frames, Transcriber};
use vsight_models::{VideoLink, VideoMetadata};

use crate::error::{AnalysisError, AnalysisResult};

const UNKNOWN: &str = "未知";

/// Result of one viral analysis run.
#[derive(Debug, Clone)]
pub struct ViralReport {
    pub link: VideoLink,
    pub frame_count: usize,
    pub transcript: String,
    pub analysis: String,
}

/// Analyst prompt over the video's engagement data and transcript.
pub fn build_viral_prompt(metadata: &VideoMetadata, transcript: &str) -> String {
    fn field<T: ToString>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    let transcript = if transcript.trim().is_empty() {
        "（无语音内容）"
    } else {
        transcript.trim()
    };

    format!(
        "请你作为专业的短视频爆款分析师，分析以下视频成为爆款的核心原因：\n\
         1. 视频基础信息：\n\
         \x20  - 标题：{title}\n\
         \x20  - 点赞数：{likes}\n\
         \x20  - 评论数：{comments}\n\
         \x20  - 分享数：{shares}\n\
         \x20  - 发布者：{author}\n\
         2. 视频音频内容：{transcript}\n\
         3. 分析要求：\n\
         \x20  - 从内容价值、情感共鸣、传播性、受众匹配4个维度分析\n\
         \x20  - 总结3个核心爆款原因，每个原因给出具体依据\n\
         \x20  - 输出结构化结论，语言简洁易懂\n",
        title = field(&metadata.title),
        likes = field(&metadata.like_count),
        comments = field(&metadata.comment_count),
        shares = field(&metadata.share_count),
        author = field(&metadata.author),
        transcript = transcript,
    )
}

/// Runs frames + transcript through a [`ContentGenerator`].
#[derive(Clone)]
pub struct ViralAnalyzer {
    generator: Arc<dyn ContentGenerator>,
    transcriber: Arc<dyn Transcriber>,
    frame_count: usize,
}

impl ViralAnalyzer {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        transcriber: Arc<dyn Transcriber>,
        frame_count: usize,
    ) -> Self {
        Self {
            generator,
            transcriber,
            frame_count,
        }
    }

    /// Full pipeline over a link and the locally downloaded video.
    pub async fn analyze(
        &self,
        link: &str,
        video: &Path,
        metadata: &VideoMetadata,
    ) -> AnalysisResult<ViralReport> {
        let link = VideoLink::parse(link).map_err(|e| AnalysisError::invalid_input(e.to_string()))?;
        info!(
            platform = %link.platform,
            video_id = link.video_id.as_deref().unwrap_or("-"),
            "Link parsed"
        );

        let frames = extract_key_frames(video, self.frame_count).await?;
        let images = frames.read_all().await?;

        let transcript = self.transcriber.transcribe(video).await?;

        let analysis = self.generate_report(metadata, &transcript, images).await?;
        Ok(ViralReport {
            link,
            frame_count: frames.len(),
            transcript,
            analysis,
        })
    }

    /// Final stage: prompt text followed by JPEG frames.
    pub async fn generate_report(
        &self,
        metadata: &VideoMetadata,
        transcript: &str,
        frames: Vec<Vec<u8>>,
    ) -> AnalysisResult<String> {
        let mut parts = Vec::with_capacity(frames.len() + 1);
        parts.push(ContentPart::text(build_viral_prompt(metadata, transcript)));
        parts.extend(frames.into_iter().map(ContentPart::jpeg));

        info!(parts = parts.len(), "Requesting viral analysis");
        self.generator
            .generate_content(parts)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or(AnalysisError::EmptyAnalysisResult)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use vsight_genai::GenAiResult;
    use vsight_media::{MediaError, MediaResult};
    use vsight_models::ErrorKind;

    use super::*;

    struct RecordingGenerator {
        reply: Option<String>,
        parts: Mutex<Vec<ContentPart>>,
    }

    #[async_trait]
    impl ContentGenerator for RecordingGenerator {
        async fn generate_content(&self, parts: Vec<ContentPart>) -> GenAiResult<Option<String>> {
            *self.parts.lock().unwrap() = parts;
            Ok(self.reply.clone())
        }
    }

    struct NoTranscriber;

    #[async_trait]
    impl Transcriber for NoTranscriber {
        async fn transcribe(&self, media: &Path) -> MediaResult<String> {
            Err(MediaError::FileNotFound(media.to_path_buf()))
        }
    }

    fn analyzer(reply: Option<&str>) -> (ViralAnalyzer, Arc<RecordingGenerator>) {
        let generator = Arc::new(RecordingGenerator {
            reply: reply.map(str::to_string),
            parts: Mutex::new(Vec::new()),
        });
        let analyzer = ViralAnalyzer::new(generator.clone(), Arc::new(NoTranscriber), 5);
        (analyzer, generator)
    }

    #[test]
    fn test_prompt_includes_metadata_and_transcript() {
        let metadata = VideoMetadata::default()
            .with_title("猫咪弹钢琴")
            .with_author("喵星人")
            .with_engagement(125_000, 8_900, 32_000);

        let prompt = build_viral_prompt(&metadata, "  大家好  ");
        assert!(prompt.contains("标题：猫咪弹钢琴"));
        assert!(prompt.contains("点赞数：125000"));
        assert!(prompt.contains("分享数：32000"));
        assert!(prompt.contains("发布者：喵星人"));
        assert!(prompt.contains("视频音频内容：大家好\n"));
        assert!(prompt.contains("4个维度"));
        assert!(prompt.contains("3个核心爆款原因"));
    }

    #[test]
    fn test_prompt_marks_missing_fields() {
        let prompt = build_viral_prompt(&VideoMetadata::default(), "");
        assert!(prompt.contains("标题：未知"));
        assert!(prompt.contains("（无语音内容）"));
    }

    #[tokio::test]
    async fn test_report_sends_prompt_then_frames() {
        let (analyzer, generator) = analyzer(Some("三个原因"));

        let report = analyzer
            .generate_report(&VideoMetadata::default(), "hi", vec![vec![1], vec![2]])
            .await
            .unwrap();
        assert_eq!(report, "三个原因");

        let parts = generator.parts.lock().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], ContentPart::Text(t) if t.contains("hi")));
        assert_eq!(parts[2], ContentPart::jpeg(vec![2]));
    }

    #[tokio::test]
    async fn test_empty_report_is_error() {
        let (analyzer, _) = analyzer(Some(""));
        let err = analyzer
            .generate_report(&VideoMetadata::default(), "", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyAnalysisResult);
    }

    #[tokio::test]
    async fn test_bad_link_rejected_before_media_work() {
        let (analyzer, generator) = analyzer(Some("x"));
        let err = analyzer
            .analyze(
                "https://example.com/v/1",
                Path::new("/missing.mp4"),
                &VideoMetadata::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(generator.parts.lock().unwrap().is_empty());
    }
}
