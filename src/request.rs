use std::future::Future;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::output::{render_json, render_txt};
use crate::youtube::CaptionFetcher;
use crate::{CaptionLine, Error, Result, Transcript, VideoId};

/// Transcript serialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    /// `[HH:MM:SS] text` lines
    #[default]
    Txt,
    /// `{ time, text }` objects
    Json,
}

impl TranscriptFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TranscriptFormat::Txt => "txt",
            TranscriptFormat::Json => "json",
        }
    }
}

/// A request for one video's transcript, by URL or bare id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    pub video_id: Option<String>,
    pub video_url: Option<String>,
    #[serde(default, alias = "transcriptFormat")]
    pub format: TranscriptFormat,
}

impl TranscriptRequest {
    pub fn new(input: impl Into<String>, format: TranscriptFormat) -> Self {
        Self {
            video_id: None,
            video_url: Some(input.into()),
            format,
        }
    }

    /// The video this request is about; the URL wins over the id when both are set
    pub fn video_id(&self) -> Result<VideoId> {
        let input = self
            .video_url
            .as_deref()
            .or(self.video_id.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidInput("missing video URL".to_string()))?;
        input.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TranscriptBody {
    Text(String),
    Lines(Vec<CaptionLine>),
}

impl TranscriptBody {
    pub fn render(transcript: Transcript, format: TranscriptFormat) -> Self {
        match format {
            TranscriptFormat::Txt => TranscriptBody::Text(render_txt(transcript.lines())),
            TranscriptFormat::Json => TranscriptBody::Lines(transcript.into_lines()),
        }
    }

    /// Printable form: the txt string as-is, lines as pretty JSON
    pub fn to_text(&self) -> Result<String> {
        match self {
            TranscriptBody::Text(text) => Ok(text.clone()),
            TranscriptBody::Lines(lines) => render_json(lines),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub video_id: VideoId,
    pub title: String,
    pub format: TranscriptFormat,
    pub transcript: TranscriptBody,
}

/// Resolve, fetch and render a transcript.
///
/// Unresolvable input is `Error::InvalidInput`, a video without captions is
/// `Error::Unavailable`; the two never collapse into each other.
pub async fn handle(fetcher: &CaptionFetcher, request: &TranscriptRequest) -> Result<TranscriptResponse> {
    let video_id = request.video_id()?;
    let transcript = fetcher
        .acquire(&video_id)
        .await?
        .ok_or_else(|| Error::Unavailable(video_id.clone()))?;

    Ok(TranscriptResponse {
        title: format!("video_{video_id}"),
        video_id,
        format: request.format,
        transcript: TranscriptBody::render(transcript, request.format),
    })
}

/// Delay before re-run number `attempt + 1`: 500ms doubling, saturating
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(2u64.saturating_pow(attempt).saturating_mul(500))
}

/// Re-run an operation after transport failures, with exponential backoff.
///
/// Each attempt starts from scratch; other errors are returned immediately.
/// `retries = 0` means a single attempt.
pub async fn retry<F, Fut, T>(retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Err(e) if e.is_retryable() && attempt < retries => {
                let delay = backoff_delay(attempt);
                debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
