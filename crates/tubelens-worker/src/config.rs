//! Worker configuration.

use std::time::Duration;

use crate::retry::RetryConfig;

/// Default Gemini models, tried in order.
pub const DEFAULT_GEMINI_MODELS: &[&str] =
    &["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.0-flash"];

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// Gemini models tried in order until one answers
    pub gemini_models: Vec<String>,
    /// Gemini REST base URL
    pub gemini_api_base: String,
    /// YouTube Data API key
    pub youtube_api_key: Option<String>,
    /// YouTube Data API base URL
    pub youtube_api_base: String,
    /// Caption languages in preference order
    pub transcript_languages: Vec<String>,
    /// Work directory for temporary subtitle files
    pub work_dir: String,
    /// Keep only the first N videos of a playlist
    pub max_videos_per_playlist: Option<usize>,
    /// Retries after the first attempt for transcript and generation calls
    pub max_retries: u32,
    /// Base backoff delay (doubles each retry)
    pub retry_base_delay: Duration,
    /// Backoff ceiling
    pub retry_max_delay: Duration,
    /// Generator calls per minute; 0 disables pacing
    pub generation_rate_per_minute: u32,
    /// Timeout for one playlist page request
    pub listing_timeout: Duration,
    /// Timeout for one transcript fetch
    pub transcript_timeout: Duration,
    /// Timeout for one generator request
    pub generation_timeout: Duration,
    /// How long a completed task stays visible to pollers
    pub task_retention: Duration,
    /// Skip videos that already have an analysis
    pub skip_analyzed: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_models: DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            youtube_api_key: None,
            youtube_api_base: DEFAULT_YOUTUBE_API_BASE.to_string(),
            transcript_languages: vec!["en".to_string(), "pt".to_string()],
            work_dir: "/tmp/tubelens".to_string(),
            max_videos_per_playlist: None,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(10),
            generation_rate_per_minute: 60,
            listing_timeout: Duration::from_secs(30),
            transcript_timeout: Duration::from_secs(60),
            generation_timeout: Duration::from_secs(120),
            task_retention: Duration::from_secs(60),
            skip_analyzed: false,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_models: non_empty_var("GEMINI_MODELS")
                .map(|s| split_csv(&s))
                .filter(|models| !models.is_empty())
                .unwrap_or(defaults.gemini_models),
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or(defaults.gemini_api_base),
            youtube_api_key: non_empty_var("YOUTUBE_API_KEY"),
            youtube_api_base: std::env::var("YOUTUBE_API_BASE")
                .unwrap_or(defaults.youtube_api_base),
            transcript_languages: non_empty_var("TRANSCRIPT_LANGS")
                .map(|s| split_csv(&s))
                .filter(|langs| !langs.is_empty())
                .unwrap_or(defaults.transcript_languages),
            work_dir: std::env::var("WORKER_WORK_DIR").unwrap_or(defaults.work_dir),
            max_videos_per_playlist: parsed_var::<usize>("MAX_VIDEOS_PER_PLAYLIST")
                .filter(|&n| n > 0),
            max_retries: parsed_var("GENERATION_MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_base_delay: parsed_var("RETRY_BASE_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_base_delay),
            retry_max_delay: parsed_var("RETRY_MAX_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_max_delay),
            generation_rate_per_minute: parsed_var("GENERATION_RATE_PER_MINUTE")
                .unwrap_or(defaults.generation_rate_per_minute),
            listing_timeout: parsed_var("LISTING_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.listing_timeout),
            transcript_timeout: parsed_var("TRANSCRIPT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.transcript_timeout),
            generation_timeout: parsed_var("GENERATION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.generation_timeout),
            task_retention: parsed_var("TASK_RETENTION_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.task_retention),
            skip_analyzed: std::env::var("SKIP_ANALYZED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.skip_analyzed),
        }
    }

    /// Backoff settings shared by transcript and generation calls.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new("worker")
            .with_max_retries(self.max_retries)
            .with_base_delay(self.retry_base_delay)
            .with_max_delay(self.retry_max_delay)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.transcript_languages, vec!["en", "pt"]);
        assert_eq!(config.gemini_models[0], "gemini-2.5-flash");
        assert_eq!(config.generation_rate_per_minute, 60);
        assert!(!config.skip_analyzed);
        assert!(config.max_videos_per_playlist.is_none());
        assert_eq!(config.listing_timeout, Duration::from_secs(30));
        assert_eq!(config.transcript_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_retry_config_from_worker_config() {
        let config = WorkerConfig {
            max_retries: 5,
            ..Default::default()
        };
        let retry = config.retry_config();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv(" en, pt ,,es"), vec!["en", "pt", "es"]);
        assert!(split_csv(" , ").is_empty());
    }
}
