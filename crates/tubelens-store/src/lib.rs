//! Video record persistence.
//!
//! This crate provides:
//! - The `RecordStore` seam the orchestrator persists through
//! - An in-memory store for tests and ephemeral runs
//! - A SQLite store keyed by video ID with the analysis embedded as JSON

pub mod error;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use tubelens_models::{Analysis, Video, VideoId, VideoRecord};

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Durable home of processed videos.
///
/// Upserts are keyed by video ID: writing a known video replaces its
/// transcript and analysis.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace the record for `video.video_id`.
    async fn upsert(&self, video: Video, analysis: Option<Analysis>) -> StoreResult<()>;

    /// Fetch one record, `None` if the video was never stored.
    async fn get(&self, video_id: &VideoId) -> StoreResult<Option<VideoRecord>>;

    /// Records in first-insertion order.
    async fn list(&self, skip: usize, limit: usize) -> StoreResult<Vec<VideoRecord>>;
}

/// Open the store named by a `DATABASE_PATH` value.
///
/// `memory` and `:memory:` select the in-memory store; anything else is a
/// SQLite file, created on first use.
pub async fn open_store(database_path: &str) -> StoreResult<Arc<dyn RecordStore>> {
    match database_path.trim() {
        "memory" | ":memory:" => {
            tracing::info!("Using in-memory record store");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        path => {
            tracing::info!(path = %path, "Using SQLite record store");
            Ok(Arc::new(SqliteRecordStore::open(path).await?))
        }
    }
}
