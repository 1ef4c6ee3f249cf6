//! Playlist processing handlers: start a task and poll its progress.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use tubelens_models::{extract_playlist_id, Task, TaskId};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Start processing request.
#[derive(Debug, Deserialize, Validate)]
pub struct ProcessRequest {
    /// Playlist ID or any YouTube URL carrying `list=`
    #[serde(alias = "playlist_url")]
    #[validate(length(min = 1, max = 2048))]
    pub playlist_id: String,
}

/// Start processing response.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub task_id: TaskId,
}

/// Accept a playlist and process it in the background.
///
/// Returns 202 with the task ID before any video is processed.
pub async fn process_playlist(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<(StatusCode, Json<ProcessResponse>)> {
    request.validate()?;
    let playlist_id = extract_playlist_id(&request.playlist_id)?;

    let task_id = state.orchestrator.start(playlist_id.clone()).await;
    metrics::record_task_submitted();
    info!(task_id = %task_id, playlist_id = %playlist_id, "Playlist processing started");

    Ok((
        StatusCode::ACCEPTED,
        Json(ProcessResponse {
            message: "Playlist processing started.".to_string(),
            task_id,
        }),
    ))
}

/// Current progress snapshot of a task.
///
/// A task that finished and left its retention window is reported as 404,
/// which pollers treat as a terminal signal.
pub async fn get_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    state
        .tasks()
        .get(&TaskId::from_string(task_id))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task not found"))
}
