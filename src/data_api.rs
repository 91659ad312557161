//! Thin client for the YouTube Data API v3: channels, upload playlists, video details.

use std::time::Duration;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::youtube::DEFAULT_TIMEOUT;
use crate::{Error, Result};

pub const DATA_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Most ids the API accepts or returns per request
pub const MAX_PAGE_SIZE: usize = 50;

const NOT_AVAILABLE: &str = "N/A";

/// How to find a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelLookup {
    Id(String),
    Username(String),
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_at: String,
    pub custom_url: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub view_count: Option<String>,
    pub subscriber_count: Option<String>,
    pub video_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
    pub content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

/// Flattened channel summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    pub published_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub view_count: String,
    pub subscriber_count: String,
    pub video_count: String,
}

impl From<Channel> for ChannelInfo {
    fn from(channel: Channel) -> Self {
        let stats = channel.statistics;
        Self {
            id: channel.id,
            title: channel.snippet.title,
            description: channel.snippet.description,
            custom_url: channel.snippet.custom_url,
            published_at: channel.snippet.published_at,
            thumbnail_url: channel.snippet.thumbnails.best_url(),
            country: channel.snippet.country,
            view_count: stats.view_count.unwrap_or_else(not_available),
            subscriber_count: stats.subscriber_count.unwrap_or_else(not_available),
            video_count: stats.video_count.unwrap_or_else(not_available),
        }
    }
}

/// Flattened per-video metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub view_count: String,
    pub like_count: String,
    pub comment_count: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl From<Video> for VideoInfo {
    fn from(video: Video) -> Self {
        let stats = video.statistics;
        Self {
            video_id: video.id,
            title: video.snippet.title,
            description: video.snippet.description,
            published_at: video.snippet.published_at,
            thumbnail_url: video.snippet.thumbnails.best_url(),
            view_count: stats.view_count.unwrap_or_else(not_available),
            like_count: stats.like_count.unwrap_or_else(not_available),
            comment_count: stats.comment_count.unwrap_or_else(not_available),
            duration: video.content_details.and_then(|d| d.duration),
        }
    }
}

impl Thumbnails {
    /// High resolution if there is one, else the default
    fn best_url(&self) -> Option<String> {
        self.high
            .as_ref()
            .or(self.default.as_ref())
            .map(|t| t.url.clone())
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

impl Channel {
    /// Id of the playlist holding every upload of the channel
    pub fn uploads_playlist_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|d| d.related_playlists.uploads.as_deref())
    }
}

/// YouTube Data API client, authenticated with an API key
#[derive(Debug, Clone)]
pub struct DataApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl DataApi {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DATA_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Look up a channel by id or legacy username
    pub async fn channel(&self, lookup: &ChannelLookup) -> Result<Channel> {
        let (key, value) = match lookup {
            ChannelLookup::Id(id) => ("id", id.as_str()),
            ChannelLookup::Username(name) => ("forUsername", name.as_str()),
        };

        let resp: ListResponse<Channel> = self
            .get("channels", &[("part", "snippet,statistics,contentDetails"), (key, value)])
            .await?;

        resp.items.into_iter().next().ok_or(Error::ChannelNotFound)
    }

    /// Video ids of a playlist, in playlist order, at most `max`
    pub async fn uploads_video_ids(&self, playlist_id: &str, max: usize) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        if max == 0 {
            return Ok(ids);
        }

        let page_size = MAX_PAGE_SIZE.to_string();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("part", "snippet,contentDetails"),
                ("maxResults", page_size.as_str()),
                ("playlistId", playlist_id),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let resp: ListResponse<PlaylistItem> = self.get("playlistItems", &query).await?;
            ids.extend(resp.items.into_iter().map(|item| item.content_details.video_id));
            debug!("Collected {} video ids from playlist {playlist_id}", ids.len());

            match resp.next_page_token {
                Some(token) if ids.len() < max => page_token = Some(token),
                _ => break,
            }
        }

        ids.truncate(max);
        Ok(ids)
    }

    /// Details for the given videos, fetched in chunks of 50 ids
    pub async fn videos(&self, ids: &[String]) -> Result<Vec<Video>> {
        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE) {
            let joined = chunk.join(",");
            let resp: ListResponse<Video> = self
                .get("videos", &[("part", "snippet,contentDetails,statistics"), ("id", joined.as_str())])
                .await?;
            videos.extend(resp.items);
        }
        Ok(videos)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!("Data API request: {url}");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            return Err(Error::Api(format!("{endpoint} returned {status}: {body}")));
        }

        serde_json::from_str(&body).map_err(|e| Error::Api(format!("unexpected {endpoint} response: {e}")))
    }
}
