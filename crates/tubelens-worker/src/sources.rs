//! Collaborator seams the orchestrator depends on.
//!
//! Production implementations live in [`crate::youtube`],
//! [`crate::transcript`] and [`crate::gemini`]; tests substitute fakes.

use async_trait::async_trait;

use tubelens_models::{PlaylistVideo, VideoId};

use crate::error::WorkerResult;

/// Lists the videos of a playlist.
#[async_trait]
pub trait VideoLister: Send + Sync {
    /// Videos in playlist order.
    ///
    /// Fails with [`WorkerError::InvalidPlaylist`](crate::WorkerError::InvalidPlaylist)
    /// when the playlist does not exist or cannot be read.
    async fn list(&self, playlist_id: &str) -> WorkerResult<Vec<PlaylistVideo>>;
}

/// Fetches caption text for one video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fails with `NoTranscript` when the video has no usable captions and
    /// `TransientFetch` when the fetch may succeed on retry.
    async fn fetch(&self, video_id: &VideoId) -> WorkerResult<String>;
}

/// Turns a transcript into raw analysis text.
#[async_trait]
pub trait AnalysisGenerator: Send + Sync {
    /// Fails with `TransientService` on timeouts and rate limits.
    async fn generate(&self, transcript: &str) -> WorkerResult<String>;
}
