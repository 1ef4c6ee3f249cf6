//! Playlist processing task models.
//!
//! A task is one run of playlist processing. Its snapshot is what pollers
//! observe while the owning orchestrator advances through the playlist.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Message a task carries from creation until its orchestrator starts listing.
pub const INITIAL_MESSAGE: &str = "Initializing...";

/// Message a task carries once every video has been attempted.
pub const COMPLETE_MESSAGE: &str = "Processing complete.";

/// Unique identifier for a processing task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Accepted, orchestrator not yet running
    #[default]
    Pending,
    /// Orchestrator is listing or processing videos
    Running,
    /// Finished, either normally or after a fatal listing error
    Complete,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Complete)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress snapshot of a playlist processing task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Task {
    /// Task ID
    pub task_id: TaskId,

    /// Lifecycle state
    #[serde(default)]
    pub state: TaskState,

    /// Human-readable status
    pub message: String,

    /// Videos analyzed and persisted
    #[serde(default)]
    pub processed_count: u32,

    /// Videos without a usable transcript
    #[serde(default)]
    pub skipped_count: u32,

    /// Videos whose processing failed
    #[serde(default)]
    pub failed_count: u32,

    /// Number of videos selected for this run (0 until listing finishes)
    #[serde(default)]
    pub total_videos: u32,

    /// Video currently being processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_video_id: Option<String>,

    /// Title of the video currently being processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_video_title: Option<String>,
}

impl Task {
    /// Create a fresh task snapshot with zeroed counters.
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            state: TaskState::Pending,
            message: INITIAL_MESSAGE.to_string(),
            processed_count: 0,
            skipped_count: 0,
            failed_count: 0,
            total_videos: 0,
            current_video_id: None,
            current_video_title: None,
        }
    }

    /// Number of videos that reached an outcome so far.
    pub fn attempted(&self) -> u32 {
        self.processed_count + self.skipped_count + self.failed_count
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
