//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// The playlist cannot be listed; fatal for the whole task.
    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(String),

    /// The video has no usable captions; the video is skipped.
    #[error("No transcript available: {0}")]
    NoTranscript(String),

    #[error("Transcript fetch failed: {0}")]
    TransientFetch(String),

    #[error("Generation service unavailable: {0}")]
    TransientService(String),

    /// Permanent generator failure (rejected request, every model refused).
    #[error("Generation service error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    Store(#[from] tubelens_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_playlist(msg: impl Into<String>) -> Self {
        Self::InvalidPlaylist(msg.into())
    }

    pub fn no_transcript(msg: impl Into<String>) -> Self {
        Self::NoTranscript(msg.into())
    }

    pub fn transient_fetch(msg: impl Into<String>) -> Self {
        Self::TransientFetch(msg.into())
    }

    pub fn transient_service(msg: impl Into<String>) -> Self {
        Self::TransientService(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::TransientFetch(_) | WorkerError::TransientService(_)
        )
    }

    /// Check if error means the video simply has no captions.
    pub fn is_no_transcript(&self) -> bool {
        matches!(self, WorkerError::NoTranscript(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_errors_retry() {
        assert!(WorkerError::transient_fetch("timeout").is_retryable());
        assert!(WorkerError::transient_service("429").is_retryable());
        assert!(!WorkerError::no_transcript("disabled").is_retryable());
        assert!(!WorkerError::invalid_playlist("404").is_retryable());
        assert!(!WorkerError::service("400").is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = WorkerError::invalid_playlist("playlist PLx not found");
        assert_eq!(err.to_string(), "Invalid playlist: playlist PLx not found");
        assert!(WorkerError::no_transcript("x").is_no_transcript());
    }
}
