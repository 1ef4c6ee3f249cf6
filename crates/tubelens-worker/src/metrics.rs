//! Prometheus metrics for playlist processing.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! exporter that renders them.

use metrics::{counter, histogram};

use crate::parser::ParseStage;
use crate::task_store::VideoOutcome;

/// Metric names as constants for consistency.
pub mod names {
    pub const TASKS_STARTED_TOTAL: &str = "tubelens_tasks_started_total";
    pub const TASKS_FINISHED_TOTAL: &str = "tubelens_tasks_finished_total";
    pub const VIDEOS_TOTAL: &str = "tubelens_videos_total";
    pub const GENERATION_DURATION_SECONDS: &str = "tubelens_generation_duration_seconds";
    pub const PARSE_STAGE_TOTAL: &str = "tubelens_parse_stage_total";
}

/// Record a task being started.
pub fn record_task_started() {
    counter!(names::TASKS_STARTED_TOTAL).increment(1);
}

/// Record a task reaching its terminal state (`result` is `complete` or `error`).
pub fn record_task_finished(result: &str) {
    let labels = [("result", result.to_string())];
    counter!(names::TASKS_FINISHED_TOTAL, &labels).increment(1);
}

/// Record one video outcome.
pub fn record_video(outcome: VideoOutcome) {
    let labels = [("outcome", outcome.as_str().to_string())];
    counter!(names::VIDEOS_TOTAL, &labels).increment(1);
}

/// Record generator latency, including retries.
pub fn record_generation_duration(duration_secs: f64) {
    histogram!(names::GENERATION_DURATION_SECONDS).record(duration_secs);
}

/// Record which parser stage recovered the analysis.
pub fn record_parse_stage(stage: ParseStage) {
    let labels = [("stage", stage.as_str().to_string())];
    counter!(names::PARSE_STAGE_TOTAL, &labels).increment(1);
}
