//! Playlist orchestration.
//!
//! One run lists the playlist, then walks its videos in order: fetch the
//! transcript, ask the generator for an analysis, parse it, persist. A video
//! ends `Processed`, `Skipped` (no captions) or `Failed` (retries exhausted,
//! store error) and never stops the run. Only a listing failure is fatal.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::Instrument;

use tubelens_models::{Analysis, PlaylistVideo, TaskId, Video, VideoId, COMPLETE_MESSAGE};
use tubelens_store::RecordStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::TaskLogger;
use crate::metrics;
use crate::parser;
use crate::retry::{retry_async, RetryConfig};
use crate::sources::{AnalysisGenerator, TranscriptSource, VideoLister};
use crate::task_store::{TaskDelta, TaskStore, VideoOutcome};

/// Paces generator calls across every task of this orchestrator.
pub type GenerationLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Drives playlist tasks against the injected collaborators.
#[derive(Clone)]
pub struct PlaylistOrchestrator {
    tasks: Arc<TaskStore>,
    lister: Arc<dyn VideoLister>,
    transcripts: Arc<dyn TranscriptSource>,
    generator: Arc<dyn AnalysisGenerator>,
    records: Arc<dyn RecordStore>,
    retry: RetryConfig,
    limiter: Option<Arc<GenerationLimiter>>,
    max_videos: Option<usize>,
    skip_analyzed: bool,
    transcript_timeout: Duration,
    generation_timeout: Duration,
}

impl PlaylistOrchestrator {
    /// Create an orchestrator with default retry settings and no pacing.
    pub fn new(
        tasks: Arc<TaskStore>,
        lister: Arc<dyn VideoLister>,
        transcripts: Arc<dyn TranscriptSource>,
        generator: Arc<dyn AnalysisGenerator>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let defaults = WorkerConfig::default();
        Self {
            tasks,
            lister,
            transcripts,
            generator,
            records,
            retry: defaults.retry_config(),
            limiter: None,
            max_videos: None,
            skip_analyzed: false,
            transcript_timeout: defaults.transcript_timeout,
            generation_timeout: defaults.generation_timeout,
        }
    }

    /// Apply retry, pacing, cap, skip and timeout settings.
    pub fn with_config(self, config: &WorkerConfig) -> Self {
        Self {
            retry: config.retry_config(),
            max_videos: config.max_videos_per_playlist,
            skip_analyzed: config.skip_analyzed,
            transcript_timeout: config.transcript_timeout,
            generation_timeout: config.generation_timeout,
            ..self
        }
        .with_rate_limit(config.generation_rate_per_minute)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Allow at most `per_minute` generator calls per minute; 0 disables pacing.
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.limiter = NonZeroU32::new(per_minute)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        self
    }

    /// Keep only the first `max_videos` of each playlist.
    pub fn with_max_videos(mut self, max_videos: Option<usize>) -> Self {
        self.max_videos = max_videos;
        self
    }

    pub fn with_skip_analyzed(mut self, skip_analyzed: bool) -> Self {
        self.skip_analyzed = skip_analyzed;
        self
    }

    pub fn with_timeouts(mut self, transcript: Duration, generation: Duration) -> Self {
        self.transcript_timeout = transcript;
        self.generation_timeout = generation;
        self
    }

    pub fn tasks(&self) -> &Arc<TaskStore> {
        &self.tasks
    }

    /// Register a task and process the playlist in the background.
    ///
    /// Returns as soon as the task is registered.
    pub async fn start(&self, playlist_id: impl Into<String>) -> TaskId {
        let task_id = self.tasks.create().await;
        let playlist_id = playlist_id.into();
        let span = TaskLogger::new(&task_id, &playlist_id).create_span();

        let this = self.clone();
        let id = task_id.clone();
        tokio::spawn(async move { this.run(&id, &playlist_id).await }.instrument(span));

        task_id
    }

    /// Process a playlist under an already registered task, to completion.
    pub async fn run(&self, task_id: &TaskId, playlist_id: &str) {
        let logger = TaskLogger::new(task_id, playlist_id);
        metrics::record_task_started();
        logger.log_start("listing playlist");

        self.update(
            task_id,
            TaskDelta::message(format!("Fetching video IDs for playlist {}...", playlist_id)),
        )
        .await;

        let videos = match self.lister.list(playlist_id).await {
            Ok(videos) => videos,
            Err(e) => {
                let message = format!("Error: {}", e);
                logger.log_error(&message);
                self.finish(task_id, message).await;
                metrics::record_task_finished("error");
                return;
            }
        };

        let videos = self.select(videos);
        let total = videos.len();
        logger.log_progress(&format!("{} videos to process", total));
        self.update(
            task_id,
            TaskDelta::message(format!("Found {} videos", total))
                .with_total(u32::try_from(total).unwrap_or(u32::MAX)),
        )
        .await;

        let (mut processed, mut skipped, mut failed) = (0usize, 0usize, 0usize);
        for (index, entry) in videos.into_iter().enumerate() {
            let title = entry.display_title().to_string();
            self.update(
                task_id,
                TaskDelta::video(
                    entry.video_id.as_str(),
                    title.clone(),
                    format!("Processing video {}/{}", index + 1, total),
                ),
            )
            .await;

            let outcome = self
                .process_video(&logger, playlist_id, entry.video_id, title)
                .await;

            metrics::record_video(outcome);
            match outcome {
                VideoOutcome::Processed => processed += 1,
                VideoOutcome::Skipped => skipped += 1,
                VideoOutcome::Failed => failed += 1,
            }
            self.update(task_id, TaskDelta::outcome(outcome)).await;
        }

        logger.log_completion(&format!(
            "{} processed, {} skipped, {} failed",
            processed, skipped, failed
        ));
        self.finish(task_id, COMPLETE_MESSAGE).await;
        metrics::record_task_finished("complete");
    }

    /// Apply the static cap, keeping list order.
    fn select(&self, mut videos: Vec<PlaylistVideo>) -> Vec<PlaylistVideo> {
        if let Some(max) = self.max_videos {
            videos.truncate(max);
        }
        videos
    }

    async fn process_video(
        &self,
        logger: &TaskLogger,
        playlist_id: &str,
        video_id: VideoId,
        title: String,
    ) -> VideoOutcome {
        if self.skip_analyzed && self.already_analyzed(logger, &video_id).await {
            logger.log_progress(&format!("Skipping {}: already analyzed", video_id));
            return VideoOutcome::Skipped;
        }

        let video = Video::new(video_id.clone(), playlist_id, title);

        let transcript = match self.fetch_transcript(&video_id).await {
            Ok(transcript) => transcript,
            Err(e) if e.is_no_transcript() => {
                logger.log_progress(&format!("Skipping {}: {}", video_id, e));
                return self.persist(logger, video, None, VideoOutcome::Skipped).await;
            }
            Err(e) => {
                logger.log_warning(&format!("Transcript for {} failed: {}", video_id, e));
                return VideoOutcome::Failed;
            }
        };

        let raw = match self.generate(&transcript).await {
            Ok(raw) => raw,
            Err(e) => {
                logger.log_warning(&format!("Analysis for {} failed: {}", video_id, e));
                let video = video.with_transcript(transcript);
                return self.persist(logger, video, None, VideoOutcome::Failed).await;
            }
        };

        let candidate = parser::parse(&raw);
        metrics::record_parse_stage(candidate.stage);
        let analysis = candidate.into_analysis();
        if analysis.is_none() {
            logger.log_warning(&format!("No analysis fields recovered for {}", video_id));
        }

        let video = video.with_transcript(transcript);
        self.persist(logger, video, analysis, VideoOutcome::Processed)
            .await
    }

    async fn already_analyzed(&self, logger: &TaskLogger, video_id: &VideoId) -> bool {
        match self.records.get(video_id).await {
            Ok(record) => record.is_some_and(|r| r.analysis.is_some()),
            Err(e) => {
                logger.log_warning(&format!("Record lookup for {} failed: {}", video_id, e));
                false
            }
        }
    }

    async fn fetch_transcript(&self, video_id: &VideoId) -> WorkerResult<String> {
        let config = self.retry.named(format!("transcript {}", video_id));
        let timeout = self.transcript_timeout;
        let transcripts = &self.transcripts;

        let transcript = retry_async(&config, WorkerError::is_retryable, || async move {
            match tokio::time::timeout(timeout, transcripts.fetch(video_id)).await {
                Ok(result) => result,
                Err(_) => Err(WorkerError::transient_fetch(format!(
                    "timed out after {:?}",
                    timeout
                ))),
            }
        })
        .await
        .into_result()?;

        if transcript.trim().is_empty() {
            return Err(WorkerError::no_transcript("transcript is empty"));
        }
        Ok(transcript)
    }

    async fn generate(&self, transcript: &str) -> WorkerResult<String> {
        let config = self.retry.named("generate");
        let timeout = self.generation_timeout;
        let generator = &self.generator;
        let limiter = self.limiter.as_deref();
        let started = Instant::now();

        let result = retry_async(&config, WorkerError::is_retryable, || async move {
            if let Some(limiter) = limiter {
                limiter.until_ready().await;
            }
            match tokio::time::timeout(timeout, generator.generate(transcript)).await {
                Ok(result) => result,
                Err(_) => Err(WorkerError::transient_service(format!(
                    "timed out after {:?}",
                    timeout
                ))),
            }
        })
        .await
        .into_result();

        metrics::record_generation_duration(started.elapsed().as_secs_f64());
        result
    }

    /// Upsert the video; a store failure turns the outcome into `Failed`.
    async fn persist(
        &self,
        logger: &TaskLogger,
        video: Video,
        analysis: Option<Analysis>,
        outcome: VideoOutcome,
    ) -> VideoOutcome {
        let video_id = video.video_id.clone();
        match self.records.upsert(video, analysis).await {
            Ok(()) => outcome,
            Err(e) => {
                logger.log_warning(&format!("Saving {} failed: {}", video_id, e));
                VideoOutcome::Failed
            }
        }
    }

    async fn update(&self, task_id: &TaskId, delta: TaskDelta) {
        if let Err(e) = self.tasks.update(task_id, delta).await {
            tracing::warn!(task_id = %task_id, error = %e, "Dropped task update");
        }
    }

    async fn finish(&self, task_id: &TaskId, message: impl Into<String>) {
        if let Err(e) = self.tasks.complete(task_id, message).await {
            tracing::warn!(task_id = %task_id, error = %e, "Task completion rejected");
        }
    }
}
