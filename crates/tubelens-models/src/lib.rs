//! Shared data models for TubeLens.
//!
//! This crate provides Serde-serializable types for:
//! - Playlist processing tasks and their progress snapshots
//! - Videos and their persisted records
//! - Structured transcript analyses and verdicts
//! - Playlist identifier parsing

pub mod analysis;
pub mod task;
pub mod utils;
pub mod video;

// Re-export common types
pub use analysis::{Analysis, Verdict};
pub use task::{Task, TaskId, TaskState, COMPLETE_MESSAGE, INITIAL_MESSAGE};
pub use utils::{extract_playlist_id, PlaylistIdError, PlaylistIdResult};
pub use video::{PlaylistVideo, Video, VideoId, VideoRecord, UNKNOWN_TITLE};
