//! Application state.

use std::sync::Arc;

use tubelens_store::{open_store, RecordStore};
use tubelens_worker::{
    GeminiClient, PlaylistOrchestrator, TaskStore, WorkerConfig, YouTubeClient,
    YtDlpTranscriptSource,
};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orchestrator: PlaylistOrchestrator,
    pub records: Arc<dyn RecordStore>,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    pub async fn new(config: ApiConfig, worker_config: WorkerConfig) -> ApiResult<Self> {
        let records = open_store(&config.database_path).await?;

        let lister = YouTubeClient::new(&worker_config)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        let generator = GeminiClient::new(&worker_config)
            .map_err(|e| ApiError::internal(e.to_string()))?;

        let orchestrator = PlaylistOrchestrator::new(
            Arc::new(TaskStore::new(worker_config.task_retention)),
            Arc::new(lister),
            Arc::new(YtDlpTranscriptSource::new(&worker_config)),
            Arc::new(generator),
            records.clone(),
        )
        .with_config(&worker_config);

        Ok(Self::from_parts(config, orchestrator, records))
    }

    /// Assemble state from an already built orchestrator and store.
    pub fn from_parts(
        config: ApiConfig,
        orchestrator: PlaylistOrchestrator,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            records,
        }
    }

    pub fn tasks(&self) -> &Arc<TaskStore> {
        self.orchestrator.tasks()
    }
}
