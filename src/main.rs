use std::io::{self, BufRead};
use std::path::PathBuf;

use eyre::{Result, WrapErr, bail, eyre};
use log::{info, warn};

use ytextract::channel::{ChannelOptions, extract_channel};
use ytextract::config::Config;
use ytextract::data_api::{ChannelLookup, DataApi, VideoInfo};
use ytextract::output::{self, ChannelLayout};
use ytextract::request::{self, TranscriptRequest, TranscriptResponse};
use ytextract::youtube::CaptionFetcher;

mod cli;

use cli::{ChannelArgs, Cli, Command, VideoArgs};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytextract.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytextract")
        .join("logs")
}

fn build_after_help() -> String {
    let config_path = ytextract::config::config_path();
    let config_line = if config_path.exists() {
        format!("  \x1b[32m✅\x1b[0m {}", config_path.display())
    } else {
        format!("  \x1b[33m–\x1b[0m  {} (not found, using defaults)", config_path.display())
    };

    let log_path = log_dir().join("ytextract.log");

    format!(
        "\nCONFIG:\n{config_line}\n\nSupported video links:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/v/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>\n\nLogs are written to: {}",
        log_path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable config: {e}");
        Config::default()
    });

    if cli.verbose {
        let config_path = ytextract::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let client = reqwest::Client::new();

    match cli.command {
        Command::Video(args) => run_video(args, &config, client, cli.verbose).await,
        Command::Channel(args) => run_channel(args, &config, client, cli.verbose).await,
    }
}

async fn run_video(args: VideoArgs, config: &Config, client: reqwest::Client, verbose: bool) -> Result<()> {
    let fetcher = CaptionFetcher::new(client.clone()).with_timeout(config.timeout());
    let format = args.format.unwrap_or_else(|| config.format());
    let api = args
        .api_key
        .or_else(|| config.api_key.clone())
        .map(|key| DataApi::new(client, key).with_timeout(config.timeout()));

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = args.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    let urls: Vec<String> = urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    if urls.is_empty() {
        bail!("no URL or video ID provided\n\nUsage: ytextract video <URL>\n       echo <URL> | ytextract video");
    }

    let mut failed = 0;
    for url in &urls {
        let request = TranscriptRequest::new(url.as_str(), format);
        let result = request::retry(config.retries(), || request::handle(&fetcher, &request)).await;

        match result {
            Ok(response) => {
                if verbose {
                    eprintln!("Video: {} ({})", response.title, response.video_id);
                }
                emit_transcript(&response, args.output_dir.as_deref(), api.as_ref(), verbose).await?;
            }
            Err(e) => {
                let hint = if e.is_retryable() { " (transient, try again)" } else { "" };
                eprintln!("{url}: {e}{hint}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} videos produced no transcript", urls.len());
    }
    Ok(())
}

async fn emit_transcript(
    response: &TranscriptResponse,
    output_dir: Option<&std::path::Path>,
    api: Option<&DataApi>,
    verbose: bool,
) -> Result<()> {
    let content = response.transcript.to_text()?;

    let Some(dir) = output_dir else {
        println!("{content}");
        return Ok(());
    };

    let title = match api {
        Some(api) => video_title(api, response).await,
        None => response.title.clone(),
    };

    let path = output::write_transcript(dir, &title, &content, response.format)?;
    if verbose {
        eprintln!("Transcript saved to {}", path.display());
    }
    Ok(())
}

/// Video title from the Data API, falling back to `video_<id>`
async fn video_title(api: &DataApi, response: &TranscriptResponse) -> String {
    match api.videos(&[response.video_id.to_string()]).await {
        Ok(videos) => videos
            .into_iter()
            .next()
            .map(|v| v.snippet.title)
            .unwrap_or_else(|| response.title.clone()),
        Err(e) => {
            warn!("Could not fetch title for {}: {e}", response.video_id);
            response.title.clone()
        }
    }
}

async fn run_channel(args: ChannelArgs, config: &Config, client: reqwest::Client, verbose: bool) -> Result<()> {
    let api_key = args
        .api_key
        .or_else(|| config.api_key.clone())
        .ok_or_else(|| eyre!("--api-key (or YOUTUBE_API_KEY, or api_key in the config file) is required"))?;

    let lookup = if let Some(id) = args.channel_id {
        ChannelLookup::Id(id)
    } else if let Some(username) = args.username {
        ChannelLookup::Username(username)
    } else {
        bail!("either --channel-id or --username must be provided");
    };

    let api = DataApi::new(client.clone(), api_key).with_timeout(config.timeout());
    let fetcher = CaptionFetcher::new(client).with_timeout(config.timeout());
    let options = ChannelOptions {
        max_videos: args.max_videos.unwrap_or_else(|| config.max_videos()),
        with_transcripts: args.with_transcripts,
    };
    let transcript_format = args.transcript_format.unwrap_or_else(|| config.format());
    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir());

    if verbose {
        eprintln!("Retrieving up to {} videos...", options.max_videos);
        if options.with_transcripts {
            eprintln!("Extracting transcripts... (this may take a while)");
        }
    }

    let report = extract_channel(&api, &fetcher, &lookup, &options)
        .await
        .wrap_err("channel extraction failed")?;

    let layout = ChannelLayout::create(&output_dir, &report.channel_info.id)?;
    let stamp = output::run_stamp();

    output::write_json(&layout.channel_dir.join(format!("info_{stamp}.json")), &report.channel_info)?;

    let infos: Vec<&VideoInfo> = report.videos.iter().map(|v| &v.info).collect();
    output::write_json(&layout.videos_dir.join(format!("list_{stamp}.json")), &infos)?;

    for video in &report.videos {
        if let Some(lines) = &video.transcript {
            let content = output::render(lines, transcript_format)?;
            let name = output::channel_transcript_name(&video.info.title, &video.info.video_id);
            output::write_transcript(&layout.transcripts_dir, &name, &content, transcript_format)?;
        }
    }

    eprintln!(
        "Found channel: {} (ID: {})",
        report.channel_info.title, report.channel_info.id
    );
    eprintln!("Successfully retrieved {} videos", report.videos.len());
    if options.with_transcripts {
        eprintln!("Successfully extracted {} transcripts", report.transcripts_found());
    }
    println!("All data saved to {}", layout.channel_dir.display());
    Ok(())
}
