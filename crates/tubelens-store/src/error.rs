//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while persisting or reading records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid record {0}: {1}")]
    InvalidRecord(String, String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn invalid_record(video_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidRecord(video_id.into(), msg.into())
    }
}
