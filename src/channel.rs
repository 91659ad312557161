use log::{debug, info, warn};
use serde::Serialize;

use crate::data_api::{ChannelInfo, ChannelLookup, DataApi, VideoInfo};
use crate::youtube::CaptionFetcher;
use crate::{CaptionLine, Error, Result, VideoId};

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    pub max_videos: usize,
    pub with_transcripts: bool,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            max_videos: 50,
            with_transcripts: false,
        }
    }
}

/// One video of a channel, with its transcript when one was requested and found
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    #[serde(flatten)]
    pub info: VideoInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<CaptionLine>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReport {
    pub channel_info: ChannelInfo,
    pub videos: Vec<VideoEntry>,
}

impl ChannelReport {
    pub fn transcripts_found(&self) -> usize {
        self.videos.iter().filter(|v| v.transcript.is_some()).count()
    }
}

/// Collect channel metadata, its latest uploads and optionally their transcripts.
///
/// Transcripts are fetched one video at a time in upload order. A video whose
/// transcript cannot be fetched, for whatever reason, is kept without one.
pub async fn extract_channel(
    api: &DataApi,
    fetcher: &CaptionFetcher,
    lookup: &ChannelLookup,
    options: &ChannelOptions,
) -> Result<ChannelReport> {
    let channel = api.channel(lookup).await?;
    info!("Found channel: {} ({})", channel.snippet.title, channel.id);

    let playlist_id = channel
        .uploads_playlist_id()
        .ok_or_else(|| Error::Api(format!("channel {} has no uploads playlist", channel.id)))?
        .to_string();

    let ids = api.uploads_video_ids(&playlist_id, options.max_videos).await?;
    let videos = api.videos(&ids).await?;
    debug!("Fetched details for {} of {} videos", videos.len(), ids.len());

    let mut entries = Vec::with_capacity(videos.len());
    for video in videos {
        let info = VideoInfo::from(video);
        let transcript = if options.with_transcripts {
            video_transcript(fetcher, &info.video_id).await
        } else {
            None
        };
        entries.push(VideoEntry { info, transcript });
    }

    Ok(ChannelReport {
        channel_info: ChannelInfo::from(channel),
        videos: entries,
    })
}

async fn video_transcript(fetcher: &CaptionFetcher, raw_id: &str) -> Option<Vec<CaptionLine>> {
    let Some(video_id) = VideoId::resolve(raw_id) else {
        warn!("Skipping transcript for unexpected video id: {raw_id}");
        return None;
    };

    match fetcher.acquire(&video_id).await {
        Ok(Some(transcript)) => Some(transcript.into_lines()),
        Ok(None) => {
            debug!("No transcript for {video_id}");
            None
        }
        Err(e) => {
            warn!("Transcript fetch failed for {video_id}: {e}");
            None
        }
    }
}
