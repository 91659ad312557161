pub mod channel;
pub mod config;
pub mod data_api;
pub mod error;
pub mod output;
pub mod request;
pub mod timedtext;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

pub use error::{Error, Result};

/// Length every resolved video ID must have
pub const VIDEO_ID_LEN: usize = 11;

static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*((youtu\.be/)|(v/)|(/u/\w/)|(embed/)|(shorts/)|(watch\?))\??v?=?(?P<id>[^#&?]*).*")
        .expect("video URL pattern is valid")
});

/// An 11-character YouTube video identifier.
///
/// Only the length is checked, not the charset, so the token may contain
/// characters YouTube itself would never hand out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Resolve a video ID from any known YouTube URL shape or a bare ID
    pub fn resolve(input: &str) -> Option<Self> {
        let input = input.trim();

        let candidate = match VIDEO_URL_RE.captures(input) {
            Some(caps) => caps.name("id").map_or("", |m| m.as_str()),
            None => input,
        };

        if candidate.chars().count() == VIDEO_ID_LEN {
            Some(Self(candidate.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VideoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s).ok_or_else(|| Error::InvalidInput(s.to_string()))
    }
}

/// Start offset of a caption, truncated to whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Floor a fractional offset; negative and non-finite offsets have no timestamp
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        if seconds.is_finite() && seconds >= 0.0 {
            Some(Self(seconds.floor() as u64))
        } else {
            None
        }
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single caption line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionLine {
    pub time: Timestamp,
    pub text: String,
}

/// Caption lines of one video, in document order. Never empty.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    video_id: VideoId,
    lines: Vec<CaptionLine>,
}

impl Transcript {
    /// Returns `None` for an empty line list: a track with no lines is no transcript at all
    pub fn new(video_id: VideoId, lines: Vec<CaptionLine>) -> Option<Self> {
        if lines.is_empty() {
            None
        } else {
            Some(Self { video_id, lines })
        }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn lines(&self) -> &[CaptionLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CaptionLine> {
        self.lines
    }
}
