//! Transcript extraction via yt-dlp subtitles.
//!
//! Subtitles are requested in the configured languages (manual captions are
//! preferred by yt-dlp over automatic ones), downloaded as WebVTT into a
//! scratch directory and flattened to de-duplicated caption text.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use tubelens_models::VideoId;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::sources::TranscriptSource;

static TIMESTAMP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{2}:)?\d{2}:\d{2}\.\d{3}\s+-->").unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// yt-dlp stderr fragments meaning the video itself is unreachable.
const UNAVAILABLE_PATTERNS: &[&str] = &[
    "private video",
    "video unavailable",
    "video is unavailable",
    "has been removed",
    "members-only",
    "sign in to confirm your age",
    "not available in your country",
];

/// Transcript source backed by the `yt-dlp` binary.
pub struct YtDlpTranscriptSource {
    work_dir: PathBuf,
    languages: Vec<String>,
    binary: String,
}

impl YtDlpTranscriptSource {
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            work_dir: PathBuf::from(&config.work_dir),
            languages: config.transcript_languages.clone(),
            binary: std::env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
        }
    }

    async fn download_subtitles(&self, video_id: &VideoId, dir: &Path) -> WorkerResult<()> {
        let output_template = dir.join("%(id)s").to_string_lossy().into_owned();
        let languages = self.languages.join(",");
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new(&self.binary)
            .args([
                "--skip-download",
                "--write-sub",
                "--write-auto-sub",
                "--sub-lang",
                &languages,
                "--sub-format",
                "vtt",
                "--no-playlist",
                "--output",
                &output_template,
                &url,
            ])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| WorkerError::config_error(format!("Failed to run yt-dlp: {}", e)))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lowered = stderr.to_lowercase();
        if UNAVAILABLE_PATTERNS.iter().any(|p| lowered.contains(p)) {
            return Err(WorkerError::no_transcript(format!(
                "video {} is unavailable",
                video_id
            )));
        }
        Err(WorkerError::transient_fetch(format!(
            "yt-dlp failed for {}: {}",
            video_id,
            stderr.trim()
        )))
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    async fn fetch(&self, video_id: &VideoId) -> WorkerResult<String> {
        info!(video_id = %video_id, "Fetching transcript using yt-dlp");

        tokio::fs::create_dir_all(&self.work_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix("subs-")
            .tempdir_in(&self.work_dir)?;

        self.download_subtitles(video_id, scratch.path()).await?;

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(scratch.path()).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        let chosen = select_subtitle(&names, &self.languages).ok_or_else(|| {
            WorkerError::no_transcript(format!("no captions in {} for {}", self.languages.join(","), video_id))
        })?;
        debug!(file = %chosen, "Using subtitle file");

        let content = tokio::fs::read_to_string(scratch.path().join(chosen)).await?;
        let transcript = parse_vtt(&content);
        if transcript.is_empty() {
            warn!(video_id = %video_id, "Subtitle file had no caption text");
            return Err(WorkerError::no_transcript(format!("empty captions for {}", video_id)));
        }
        Ok(transcript)
    }
}

/// Pick the `.vtt` file whose language comes first in `languages`.
///
/// yt-dlp names subtitles `<id>.<lang>.vtt`; regional variants such as
/// `en-US` count as their base language.
fn select_subtitle<'a>(names: &'a [String], languages: &[String]) -> Option<&'a str> {
    names
        .iter()
        .filter(|name| name.ends_with(".vtt"))
        .min_by_key(|name| {
            let lang = name
                .trim_end_matches(".vtt")
                .rsplit('.')
                .next()
                .unwrap_or_default();
            let base = lang.split('-').next().unwrap_or(lang);
            languages
                .iter()
                .position(|l| l == lang || l == base)
                .unwrap_or(languages.len())
        })
        .map(String::as_str)
}

/// Flatten WebVTT into caption text, one cue line per line.
///
/// Headers, cue timings, numeric cue ids and markup are dropped; a line
/// repeating the previous one (rolling automatic captions) is emitted once.
pub fn parse_vtt(content: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_note = false;

    for raw in content.lines() {
        let line = raw.trim();

        if line.is_empty() {
            in_note = false;
            continue;
        }
        if in_note || line.starts_with("NOTE") {
            in_note = true;
            continue;
        }
        if line == "WEBVTT"
            || line.starts_with("WEBVTT ")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.starts_with("STYLE")
            || TIMESTAMP_LINE.is_match(line)
            || line.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }

        let text = decode_entities(&TAG.replace_all(line, ""));
        let text = text.trim();
        if text.is_empty() || lines.last().is_some_and(|last| last == text) {
            continue;
        }
        lines.push(text.to_string());
    }

    lines.join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
