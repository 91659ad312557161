use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::request::TranscriptFormat;
use crate::{CaptionLine, Result};

static UNSAFE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("filename pattern is valid"));

/// Render caption lines as `[HH:MM:SS] text`, one per line
pub fn render_txt(lines: &[CaptionLine]) -> String {
    lines
        .iter()
        .map(|l| format!("[{}] {}", l.time, l.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render caption lines as a pretty-printed JSON array of `{ time, text }`
pub fn render_json(lines: &[CaptionLine]) -> Result<String> {
    Ok(serde_json::to_string_pretty(lines)?)
}

pub fn render(lines: &[CaptionLine], format: TranscriptFormat) -> Result<String> {
    match format {
        TranscriptFormat::Txt => Ok(render_txt(lines)),
        TranscriptFormat::Json => render_json(lines),
    }
}

/// Replace characters that are not allowed in file names
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_RE.replace_all(name, "_").into_owned()
}

/// File name stem for a channel transcript; the id keeps same-titled uploads apart
pub fn channel_transcript_name(title: &str, video_id: &str) -> String {
    format!("{title}_{video_id}")
}

/// Write rendered transcript content to `<dir>/<sanitized title>.<ext>`
pub fn write_transcript(dir: &Path, title: &str, content: &str, format: TranscriptFormat) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", sanitize_filename(title), format.extension()));
    std::fs::write(&path, format!("{content}\n"))?;
    debug!("Wrote transcript: {}", path.display());
    Ok(path)
}

/// `channel_<id>/` with `videos/` and `transcripts/` under an output directory
#[derive(Debug, Clone)]
pub struct ChannelLayout {
    pub channel_dir: PathBuf,
    pub videos_dir: PathBuf,
    pub transcripts_dir: PathBuf,
}

impl ChannelLayout {
    pub fn create(base_dir: &Path, channel_id: &str) -> Result<Self> {
        let channel_dir = base_dir.join(format!("channel_{}", sanitize_filename(channel_id)));
        let layout = Self {
            videos_dir: channel_dir.join("videos"),
            transcripts_dir: channel_dir.join("transcripts"),
            channel_dir,
        };
        std::fs::create_dir_all(&layout.videos_dir)?;
        std::fs::create_dir_all(&layout.transcripts_dir)?;
        Ok(layout)
    }
}

/// Local time stamp used to tell extraction runs apart
pub fn run_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timestamp;

    fn sample_lines() -> Vec<CaptionLine> {
        vec![
            CaptionLine {
                time: Timestamp::from_seconds(1.0).unwrap(),
                text: "Hello".to_string(),
            },
            CaptionLine {
                time: Timestamp::from_seconds(5.9).unwrap(),
                text: "World".to_string(),
            },
        ]
    }

    #[test]
    fn test_render_txt() {
        assert_eq!(render_txt(&sample_lines()), "[00:00:01] Hello\n[00:00:05] World");
    }

    #[test]
    fn test_render_txt_empty() {
        assert_eq!(render_txt(&[]), "");
    }

    #[test]
    fn test_render_json() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&sample_lines()).unwrap()).unwrap();
        assert_eq!(json[1]["time"], "00:00:05");
        assert_eq!(json[1]["text"], "World");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(r#"a/b\c*d?e:f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("plain title"), "plain title");
    }

    #[test]
    fn test_write_transcript_txt() {
        let dir = tempfile::tempdir().unwrap();
        let content = render(&sample_lines(), TranscriptFormat::Txt).unwrap();
        let path = write_transcript(dir.path(), "What? A/B", &content, TranscriptFormat::Txt).unwrap();
        assert_eq!(path.file_name().unwrap(), "What_ A_B.txt");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "[00:00:01] Hello\n[00:00:05] World\n");
    }

    #[test]
    fn test_same_titled_uploads_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let first = channel_transcript_name("Weekly update", "aaaaaaaaaaa");
        let second = channel_transcript_name("Weekly update", "bbbbbbbbbbb");
        let a = write_transcript(dir.path(), &first, "one", TranscriptFormat::Txt).unwrap();
        let b = write_transcript(dir.path(), &second, "two", TranscriptFormat::Txt).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.file_name().unwrap(), "Weekly update_aaaaaaaaaaa.txt");
        assert_eq!(std::fs::read_to_string(a).unwrap(), "one\n");
        assert_eq!(std::fs::read_to_string(b).unwrap(), "two\n");
    }

    #[test]
    fn test_channel_layout_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ChannelLayout::create(dir.path(), "UC123").unwrap();
        assert!(layout.videos_dir.is_dir());
        assert!(layout.transcripts_dir.is_dir());
        assert_eq!(layout.channel_dir, dir.path().join("channel_UC123"));
    }

    #[test]
    fn test_run_stamp_shape() {
        let stamp = run_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
    }
}
