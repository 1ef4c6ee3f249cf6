//! Video record queries.
//!
//! Pass-through reads against the record store; list views omit the
//! transcript text, the detail view includes it.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use tubelens_models::{VideoId, VideoRecord};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1000;

/// List videos query params.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListVideosQuery {
    pub skip: Option<usize>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<usize>,
}

/// Processed videos in first-insertion order.
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListVideosQuery>,
) -> ApiResult<Json<Vec<VideoRecord>>> {
    query.validate()?;
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let records = state.records.list(skip, limit).await?;
    Ok(Json(
        records
            .iter()
            .map(VideoRecord::without_transcript)
            .collect(),
    ))
}

/// One video with its transcript and analysis.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoRecord>> {
    state
        .records
        .get(&VideoId::from(video_id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Video not found"))
}
