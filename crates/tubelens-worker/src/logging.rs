//! Structured task logging utilities.
//!
//! Provides consistent, structured logging for playlist tasks with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use tubelens_models::TaskId;

/// Task logger for structured logging with consistent formatting.
///
/// Every event carries the task ID and the playlist being processed.
#[derive(Debug, Clone)]
pub struct TaskLogger {
    task_id: String,
    playlist_id: String,
}

impl TaskLogger {
    /// Create a new logger for a task processing `playlist_id`.
    pub fn new(task_id: &TaskId, playlist_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            playlist_id: playlist_id.to_string(),
        }
    }

    /// Log the start of a task.
    pub fn log_start(&self, message: &str) {
        info!(
            task_id = %self.task_id,
            playlist_id = %self.playlist_id,
            "Task started: {}", message
        );
    }

    /// Log a progress update.
    pub fn log_progress(&self, message: &str) {
        info!(
            task_id = %self.task_id,
            playlist_id = %self.playlist_id,
            "Task progress: {}", message
        );
    }

    /// Log a per-video problem that does not stop the task.
    pub fn log_warning(&self, message: &str) {
        warn!(
            task_id = %self.task_id,
            playlist_id = %self.playlist_id,
            "Task warning: {}", message
        );
    }

    /// Log a task-level failure.
    pub fn log_error(&self, message: &str) {
        error!(
            task_id = %self.task_id,
            playlist_id = %self.playlist_id,
            "Task error: {}", message
        );
    }

    /// Log the completion of a task.
    pub fn log_completion(&self, message: &str) {
        info!(
            task_id = %self.task_id,
            playlist_id = %self.playlist_id,
            "Task completed: {}", message
        );
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    /// Create a tracing span for this task.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "task",
            task_id = %self.task_id,
            playlist_id = %self.playlist_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_logger_creation() {
        let task_id = TaskId::new();
        let logger = TaskLogger::new(&task_id, "PL123");

        assert_eq!(logger.task_id(), task_id.to_string());
        assert_eq!(logger.playlist_id(), "PL123");
    }
}
