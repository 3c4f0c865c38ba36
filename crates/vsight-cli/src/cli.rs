//! Command definitions and handlers.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tokio::io::AsyncReadExt;
use tracing::info;

use vsight_core::{AnalysisConfig, AnalysisOrchestrator, AnalysisResult, ViralAnalyzer};
use vsight_genai::{ContentPart, GeminiClient, GenAiConfig};
use vsight_media::{MediaError, StagedAsset, WhisperCli, DEFAULT_FRAME_COUNT};
use vsight_models::VideoMetadata;
use vsight_store::{ResultCache, SqliteAnalysisStore};

/// Model used for the viral analysis when none is given.
const VIRAL_MODEL: &str = "gemini-2.5-pro";

const STAGE_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Parser, Debug)]
#[command(name = "vsight")]
#[command(about = "Analyze videos with Gemini and cache the results")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a local video, wait for processing and print its analysis
    Analyze {
        /// Video file to analyze
        file: PathBuf,

        /// Instruction for the model (defaults to DEFAULT_PROMPT)
        #[arg(short, long)]
        prompt: Option<String>,

        /// Media type of the file (guessed from the extension otherwise)
        #[arg(long)]
        mime: Option<String>,

        /// Keep the result in memory instead of DATABASE_URL
        #[arg(long)]
        no_cache: bool,
    },

    /// Ask a single text question
    Ask {
        prompt: String,

        #[arg(short, long)]
        model: Option<String>,

        /// Thinking token budget
        #[arg(long)]
        thinking_budget: Option<i32>,
    },

    /// Stream a text answer as it is generated
    Stream {
        prompt: String,

        #[arg(short, long)]
        model: Option<String>,
    },

    /// Explain why a short video went viral
    Viral {
        /// Douyin, Kuaishou or YouTube link
        link: String,

        /// Local copy of the video
        video: PathBuf,

        /// JSON file with title, like_count, comment_count, share_count, author
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Number of key frames to sample
        #[arg(long, default_value_t = DEFAULT_FRAME_COUNT)]
        frames: usize,

        #[arg(short, long, default_value = VIRAL_MODEL)]
        model: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Analyze {
            file,
            prompt,
            mime,
            no_cache,
        } => analyze(&file, prompt.as_deref(), mime, no_cache).await,
        Command::Ask {
            prompt,
            model,
            thinking_budget,
        } => ask(&prompt, model, thinking_budget).await,
        Command::Stream { prompt, model } => stream(&prompt, model).await,
        Command::Viral {
            link,
            video,
            metadata,
            frames,
            model,
        } => viral(&link, &video, metadata.as_deref(), frames, model).await,
    }
}

fn genai_config(model: Option<String>) -> anyhow::Result<GenAiConfig> {
    let config = GenAiConfig::from_env()?;
    Ok(match model {
        Some(model) => config.with_model(model),
        None => config,
    })
}

async fn analyze(
    file: &Path,
    prompt: Option<&str>,
    mime: Option<String>,
    no_cache: bool,
) -> anyhow::Result<()> {
    let media_type = mime.or_else(|| guess_media_type(file).map(str::to_string));

    let store = if no_cache {
        SqliteAnalysisStore::in_memory().await?
    } else {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://vsight.db".to_string());
        SqliteAnalysisStore::connect(&url).await?
    };
    let cache: Arc<dyn ResultCache> = Arc::new(store);

    let orchestrator = AnalysisOrchestrator::new(
        Arc::new(GeminiClient::new(genai_config(None)?)?),
        cache,
        AnalysisConfig::from_env(),
    );

    let asset = stage_file(&orchestrator, file).await?;
    let outcome = orchestrator
        .analyze(asset, media_type.as_deref(), prompt)
        .await?;

    info!(file_id = %outcome.file_id, record_id = %outcome.record_id, "Analysis stored");
    println!("{}", outcome.analysis);
    Ok(())
}

/// Copy a local file into the upload folder chunk by chunk, enforcing the size limit.
async fn stage_file(orchestrator: &AnalysisOrchestrator, path: &Path) -> AnalysisResult<StagedAsset> {
    let mut source = tokio::fs::File::open(path).await.map_err(MediaError::from)?;
    let name = path.file_name().and_then(|n| n.to_str());
    let mut asset = orchestrator.stage(name).await?;

    let mut buf = vec![0u8; STAGE_CHUNK_BYTES];
    loop {
        let n = source.read(&mut buf).await.map_err(MediaError::from)?;
        if n == 0 {
            break;
        }
        asset.write_chunk(&buf[..n]).await?;
    }
    Ok(asset)
}

async fn ask(prompt: &str, model: Option<String>, thinking_budget: Option<i32>) -> anyhow::Result<()> {
    let mut config = genai_config(model)?;
    if let Some(budget) = thinking_budget {
        config = config.with_thinking_budget(budget);
    }

    let answer = GeminiClient::new(config)?.generate_text(prompt).await?;
    match answer {
        Some(text) => println!("{}", text),
        None => bail!("model returned no text"),
    }
    Ok(())
}

async fn stream(prompt: &str, model: Option<String>) -> anyhow::Result<()> {
    let client = GeminiClient::new(genai_config(model)?)?;
    let mut chunks = Box::pin(client.generate_stream(vec![ContentPart::text(prompt)]).await?);

    let mut stdout = std::io::stdout();
    while let Some(chunk) = chunks.next().await {
        write!(stdout, "{}", chunk?)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

async fn viral(
    link: &str,
    video: &Path,
    metadata: Option<&Path>,
    frames: usize,
    model: String,
) -> anyhow::Result<()> {
    let metadata = match metadata {
        Some(path) => load_metadata(path).await?,
        None => VideoMetadata::default(),
    };

    let generator = Arc::new(GeminiClient::new(genai_config(Some(model))?)?);
    let analyzer = ViralAnalyzer::new(generator, Arc::new(WhisperCli::from_env()), frames);

    let report = analyzer.analyze(link, video, &metadata).await?;
    info!(
        platform = %report.link.platform,
        frames = report.frame_count,
        "Viral analysis finished"
    );
    println!("{}", report.analysis);
    Ok(())
}

async fn load_metadata(path: &Path) -> anyhow::Result<VideoMetadata> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("invalid metadata in {}", path.display()))
}

/// Media type from a video file extension.
pub fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "flv" => "video/x-flv",
        "mpeg" | "mpg" => "video/mpeg",
        "3gp" => "video/3gpp",
        _ => return None,
    })
}
