use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use ytextract::request::TranscriptFormat;

#[derive(Parser)]
#[command(
    name = "ytextract",
    about = "YouTube channel metadata and transcript extractor",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show progress and extraction details on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract the transcript of one or more videos
    Video(VideoArgs),
    /// Extract channel info, its videos and optionally their transcripts
    Channel(ChannelArgs),
}

#[derive(Args)]
pub struct VideoArgs {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Transcript format: txt (default) or json
    #[arg(short, long, value_enum)]
    pub format: Option<TranscriptFormat>,

    /// Write transcripts into this directory instead of stdout
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// YouTube Data API key, used to name output files after the video title
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["channel_id", "username"])))]
pub struct ChannelArgs {
    /// YouTube channel ID
    #[arg(long)]
    pub channel_id: Option<String>,

    /// Legacy YouTube username
    #[arg(long)]
    pub username: Option<String>,

    /// YouTube Data API key (required, here or in the config file)
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum number of videos to retrieve (default: 50)
    #[arg(long)]
    pub max_videos: Option<usize>,

    /// Also extract transcripts for every video
    #[arg(long)]
    pub with_transcripts: bool,

    /// Transcript format: txt (default) or json
    #[arg(long, value_enum)]
    pub transcript_format: Option<TranscriptFormat>,

    /// Base output directory (default: ./youtube_data)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}
