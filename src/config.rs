use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::request::TranscriptFormat;

pub const DEFAULT_OUTPUT_DIR: &str = "./youtube_data";
pub const DEFAULT_MAX_VIDEOS: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_format: Option<TranscriptFormat>,
    pub api_key: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub max_videos: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
}

impl Config {
    /// Load config from ~/.config/ytextract/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn format(&self) -> TranscriptFormat {
        self.default_format.unwrap_or_default()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn max_videos(&self) -> usize {
        self.max_videos.unwrap_or(DEFAULT_MAX_VIDEOS)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn retries(&self) -> u32 {
        self.retries.unwrap_or(0)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytextract")
        .join("config.toml")
}
