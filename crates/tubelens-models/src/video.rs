//! Video models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Analysis;

/// Title used when the platform did not report one.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Platform-assigned video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One entry of a playlist listing, in playlist order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistVideo {
    pub video_id: VideoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PlaylistVideo {
    pub fn new(video_id: impl Into<VideoId>, title: Option<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title,
        }
    }

    /// Title for display, falling back to [`UNKNOWN_TITLE`].
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN_TITLE)
    }
}

/// A video as persisted after a processing attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Platform video ID (record identity)
    pub video_id: VideoId,

    /// Playlist the video was processed from
    pub playlist_id: String,

    /// Video title
    pub title: String,

    /// Whether a transcript was fetched
    #[serde(default)]
    pub has_transcript: bool,

    /// Full transcript text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    /// When this attempt fetched the video
    pub fetch_timestamp: DateTime<Utc>,
}

impl Video {
    /// Create a video record without a transcript.
    pub fn new(
        video_id: impl Into<VideoId>,
        playlist_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            playlist_id: playlist_id.into(),
            title: title.into(),
            has_transcript: false,
            transcript: None,
            fetch_timestamp: Utc::now(),
        }
    }

    /// Attach a transcript, marking the video as transcribed.
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self.has_transcript = true;
        self
    }
}

/// A persisted video with its optional analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    #[serde(flatten)]
    pub video: Video,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

impl VideoRecord {
    pub fn new(video: Video, analysis: Option<Analysis>) -> Self {
        Self { video, analysis }
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video.video_id
    }

    /// A copy of this record without the transcript text, for list views.
    pub fn without_transcript(&self) -> Self {
        let mut record = self.clone();
        record.video.transcript = None;
        record
    }
}
