//! Playlist transcript analysis worker.
//!
//! This crate provides:
//! - The playlist orchestrator and its task progress registry
//! - Collaborator seams plus YouTube, yt-dlp and Gemini implementations
//! - Staged recovery of analyses from free-form model output
//! - Retry with exponential backoff, task logging and metrics

pub mod config;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod retry;
pub mod sources;
pub mod task_store;
pub mod transcript;
pub mod youtube;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use gemini::GeminiClient;
pub use logging::TaskLogger;
pub use orchestrator::PlaylistOrchestrator;
pub use parser::{parse, AnalysisCandidate, ParseStage};
pub use retry::RetryConfig;
pub use sources::{AnalysisGenerator, TranscriptSource, VideoLister};
pub use task_store::{TaskDelta, TaskStore, TaskStoreError, VideoOutcome};
pub use transcript::YtDlpTranscriptSource;
pub use youtube::YouTubeClient;
