use std::sync::LazyLock;
use std::time::Duration;

use log::debug;
use regex::Regex;
use reqwest::StatusCode;

use crate::timedtext::parse_timed_text;
use crate::{Error, Result, Transcript, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// Tied to the watch page's embedded player response; update here when the markup changes.
static CAPTION_TRACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""captionTracks":\[\{"baseUrl":"([^"]+)""#).expect("caption track pattern is valid")
});

/// Find the first caption track URL embedded in a watch page.
///
/// The URL sits inside a JSON string literal, so `\u0026` is turned back into `&`.
pub fn locate_caption_url(page: &str) -> Option<String> {
    CAPTION_TRACK_RE
        .captures(page)
        .map(|caps| caps[1].replace("\\u0026", "&"))
}

/// Why a pipeline run ended without a transcript
#[derive(Debug, thiserror::Error)]
enum StageError {
    #[error("watch page returned {0}")]
    PageStatus(StatusCode),
    #[error("no caption track on the watch page")]
    NoCaptionTrack,
    #[error("caption track URL is unusable: {0}")]
    BadUrl(reqwest::Error),
    #[error("caption track returned {0}")]
    CaptionStatus(StatusCode),
    #[error("malformed timed text: {0}")]
    MalformedTimedText(quick_xml::Error),
    #[error("timed text has no caption lines")]
    NoCaptionLines,
    #[error("transport failure: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for StageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            StageError::BadUrl(e)
        } else {
            StageError::Transport(e)
        }
    }
}

/// Scrapes caption transcripts: watch page, caption track discovery, timed-text parse
#[derive(Debug, Clone)]
pub struct CaptionFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CaptionFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: YOUTUBE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the watch page fetch somewhere other than youtube.com
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout, applied to each stage separately
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the transcript of a video.
    ///
    /// `Ok(None)` covers every expected way of not having one: no caption
    /// track, an error status, a broken or empty timed-text document. Only
    /// transport failures come back as `Err`.
    pub async fn acquire(&self, video_id: &VideoId) -> Result<Option<Transcript>> {
        match self.run(video_id).await {
            Ok(transcript) => Ok(Some(transcript)),
            Err(StageError::Transport(e)) => Err(Error::Transport(e)),
            Err(reason) => {
                debug!("No transcript for {video_id}: {reason}");
                Ok(None)
            }
        }
    }

    async fn run(&self, video_id: &VideoId) -> std::result::Result<Transcript, StageError> {
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");
        let page = self.fetch_text(&watch_url).await.map_err(|e| match e {
            FetchError::Status(status) => StageError::PageStatus(status),
            FetchError::Request(e) => e.into(),
        })?;

        let caption_url = locate_caption_url(&page).ok_or(StageError::NoCaptionTrack)?;
        debug!("Found caption track: {caption_url}");

        let xml = self.fetch_text(&caption_url).await.map_err(|e| match e {
            FetchError::Status(status) => StageError::CaptionStatus(status),
            FetchError::Request(e) => e.into(),
        })?;

        let lines = parse_timed_text(&xml).map_err(StageError::MalformedTimedText)?;
        Transcript::new(video_id.clone(), lines).ok_or(StageError::NoCaptionLines)
    }

    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp.text().await?)
    }
}

enum FetchError {
    Status(StatusCode),
    Request(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e)
    }
}
