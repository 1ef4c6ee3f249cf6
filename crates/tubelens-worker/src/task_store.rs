//! Process-wide registry of task progress.
//!
//! Each task has exactly one writer, the orchestrator that owns it; status
//! queries only read snapshots. Completed tasks stay readable for a retention
//! window, then resolve to not-found and are purged lazily.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use tubelens_models::{Task, TaskId, TaskState};

/// Outcome of one video within a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoOutcome {
    Processed,
    Skipped,
    Failed,
}

impl VideoOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoOutcome::Processed => "processed",
            VideoOutcome::Skipped => "skipped",
            VideoOutcome::Failed => "failed",
        }
    }
}

/// Errors from task mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskStoreError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task already complete: {0}")]
    AlreadyComplete(TaskId),
}

pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// One mutation of a running task.
///
/// Any update moves a pending task to running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDelta {
    /// Counter to increment
    pub outcome: Option<VideoOutcome>,
    /// Video now being processed (id, title)
    pub current_video: Option<(String, String)>,
    pub message: Option<String>,
    pub total_videos: Option<u32>,
}

impl TaskDelta {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn outcome(outcome: VideoOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            ..Default::default()
        }
    }

    pub fn video(
        video_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            current_video: Some((video_id.into(), title.into())),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_total(mut self, total_videos: u32) -> Self {
        self.total_videos = Some(total_videos);
        self
    }
}

#[derive(Debug)]
struct Entry {
    task: Task,
    completed_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, retention: Duration, now: Instant) -> bool {
        self.completed_at
            .is_some_and(|at| now.saturating_duration_since(at) >= retention)
    }
}

/// In-memory task registry.
#[derive(Debug)]
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, Entry>>,
    retention: Duration,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl TaskStore {
    /// Create a store keeping completed tasks visible for `retention`.
    pub fn new(retention: Duration) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Register a fresh pending task with zeroed counters.
    pub async fn create(&self) -> TaskId {
        let task_id = TaskId::new();
        let mut tasks = self.tasks.write().await;
        Self::purge_locked(&mut tasks, self.retention);
        tasks.insert(
            task_id.clone(),
            Entry {
                task: Task::new(task_id.clone()),
                completed_at: None,
            },
        );
        debug!(task_id = %task_id, "Created task");
        task_id
    }

    /// Snapshot of a task, `None` if unknown or evicted.
    pub async fn get(&self, task_id: &TaskId) -> Option<Task> {
        let now = Instant::now();
        {
            let tasks = self.tasks.read().await;
            match tasks.get(task_id) {
                None => return None,
                Some(entry) if !entry.is_expired(self.retention, now) => {
                    return Some(entry.task.clone());
                }
                Some(_) => {}
            }
        }

        let mut tasks = self.tasks.write().await;
        if tasks
            .get(task_id)
            .is_some_and(|entry| entry.is_expired(self.retention, now))
        {
            tasks.remove(task_id);
            debug!(task_id = %task_id, "Evicted completed task");
        }
        None
    }

    /// Apply one mutation to a task that is not yet complete.
    pub async fn update(&self, task_id: &TaskId, delta: TaskDelta) -> TaskStoreResult<()> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskStoreError::NotFound(task_id.clone()))?;
        let task = &mut entry.task;

        if task.state.is_terminal() {
            return Err(TaskStoreError::AlreadyComplete(task_id.clone()));
        }
        task.state = TaskState::Running;

        match delta.outcome {
            Some(VideoOutcome::Processed) => task.processed_count += 1,
            Some(VideoOutcome::Skipped) => task.skipped_count += 1,
            Some(VideoOutcome::Failed) => task.failed_count += 1,
            None => {}
        }
        if let Some((video_id, title)) = delta.current_video {
            task.current_video_id = Some(video_id);
            task.current_video_title = Some(title);
        }
        if let Some(message) = delta.message {
            task.message = message;
        }
        if let Some(total) = delta.total_videos {
            task.total_videos = total;
        }
        Ok(())
    }

    /// Set the terminal message and freeze the task.
    ///
    /// The task stays readable for the retention window.
    pub async fn complete(&self, task_id: &TaskId, message: impl Into<String>) -> TaskStoreResult<()> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskStoreError::NotFound(task_id.clone()))?;

        if entry.task.state.is_terminal() {
            return Err(TaskStoreError::AlreadyComplete(task_id.clone()));
        }
        entry.task.state = TaskState::Complete;
        entry.task.message = message.into();
        entry.task.current_video_id = None;
        entry.task.current_video_title = None;
        entry.completed_at = Some(Instant::now());

        debug!(task_id = %task_id, "Completed task");
        Ok(())
    }

    /// Drop every completed task past its retention window.
    pub async fn purge_expired(&self) -> usize {
        let mut tasks = self.tasks.write().await;
        Self::purge_locked(&mut tasks, self.retention)
    }

    /// Number of tasks currently registered, expired ones included.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn purge_locked(tasks: &mut HashMap<TaskId, Entry>, retention: Duration) -> usize {
        let now = Instant::now();
        let before = tasks.len();
        tasks.retain(|_, entry| !entry.is_expired(retention, now));
        before - tasks.len()
    }
}
