//! Router tests driving the full middleware stack with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;

use tubelens_api::{create_router, ApiConfig, AppState};
use tubelens_models::{PlaylistVideo, Video, VideoId};
use tubelens_store::{InMemoryRecordStore, RecordStore};
use tubelens_worker::{
    AnalysisGenerator, PlaylistOrchestrator, RetryConfig, TaskStore, TranscriptSource,
    VideoLister, WorkerError, WorkerResult,
};

struct StaticLister;

#[async_trait]
impl VideoLister for StaticLister {
    async fn list(&self, playlist_id: &str) -> WorkerResult<Vec<PlaylistVideo>> {
        if playlist_id == "PLmissing" {
            return Err(WorkerError::invalid_playlist("playlistNotFound"));
        }
        Ok(vec![
            PlaylistVideo::new("vid1", Some("First".to_string())),
            PlaylistVideo::new("vid2", None),
        ])
    }
}

struct StaticTranscripts;

#[async_trait]
impl TranscriptSource for StaticTranscripts {
    async fn fetch(&self, video_id: &VideoId) -> WorkerResult<String> {
        Ok(format!("captions for {}", video_id))
    }
}

struct StaticGenerator;

#[async_trait]
impl AnalysisGenerator for StaticGenerator {
    async fn generate(&self, _transcript: &str) -> WorkerResult<String> {
        Ok(r#"{"summary": "A talk about testing.", "verdict": "Summary Sufficient"}"#.to_string())
    }
}

fn app_with(config: ApiConfig) -> (Router, Arc<InMemoryRecordStore>) {
    let records = Arc::new(InMemoryRecordStore::new());
    let orchestrator = PlaylistOrchestrator::new(
        Arc::new(TaskStore::new(Duration::from_secs(60))),
        Arc::new(StaticLister),
        Arc::new(StaticTranscripts),
        Arc::new(StaticGenerator),
        records.clone(),
    )
    .with_retry(RetryConfig::new("test").with_max_retries(0))
    .with_rate_limit(0);

    let state = AppState::from_parts(config, orchestrator, records.clone());
    (create_router(state, None), records)
}

fn app() -> (Router, Arc<InMemoryRecordStore>) {
    app_with(ApiConfig {
        rate_limit_rps: 0,
        ..Default::default()
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn wait_for_completion(app: &Router, task_id: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let (status, body) = send(app, get(&format!("/status/{}", task_id))).await;
            assert_eq!(status, StatusCode::OK);
            if body["state"] == "complete" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("task completed")
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record_store"]["status"], "ok");
}

#[tokio::test]
async fn test_process_then_poll_to_completion() {
    let (app, records) = app();

    let (status, body) = send(
        &app,
        post_json(
            "/process",
            json!({"playlist_id": "https://www.youtube.com/playlist?list=PLdemo"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Playlist processing started.");
    let task_id = body["task_id"].as_str().unwrap().to_string();

    let task = wait_for_completion(&app, &task_id).await;
    assert_eq!(task["message"], "Processing complete.");
    assert_eq!(task["processed_count"], 2);
    assert_eq!(task["skipped_count"], 0);
    assert_eq!(task["failed_count"], 0);

    let stored = assert_ok!(records.get(&VideoId::from("vid2")).await).unwrap();
    assert_eq!(stored.video.playlist_id, "PLdemo");
    assert_eq!(stored.video.title, "Unknown Title");
}

#[tokio::test]
async fn test_invalid_playlist_reports_error_message() {
    let (app, _) = app();

    let (status, body) = send(&app, post_json("/process/", json!({"playlist_id": "PLmissing"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let task = wait_for_completion(&app, body["task_id"].as_str().unwrap()).await;
    let message = task["message"].as_str().unwrap();
    assert!(message.starts_with("Error: "), "got {}", message);
    assert_eq!(task["processed_count"], 0);
}

#[tokio::test]
async fn test_process_rejects_bad_input() {
    let (app, _) = app();

    let (status, body) = send(&app, post_json("/process", json!({"playlist_id": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = send(
        &app,
        post_json(
            "/process",
            json!({"playlist_id": "https://example.com/playlist?list=PL1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "URL is not a valid YouTube URL");

    let (status, _) = send(
        &app,
        post_json("/process", json!({"playlist_id": "https://www.youtube.com/watch?v=abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/status/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Task not found"}));
}

#[tokio::test]
async fn test_video_queries() {
    let (app, records) = app();
    assert_ok!(
        records
            .upsert(Video::new("a", "PL1", "A").with_transcript("alpha"), None)
            .await
    );
    assert_ok!(records.upsert(Video::new("b", "PL1", "B"), None).await);

    let (status, body) = send(&app, get("/videos")).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["video_id"], "a");
    assert!(list[0].get("transcript").is_none());
    assert_eq!(list[0]["has_transcript"], true);

    let (_, body) = send(&app, get("/videos/?skip=1&limit=5")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["video_id"], "b");

    let (status, body) = send(&app, get("/videos/a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transcript"], "alpha");

    let (status, body) = send(&app, get("/videos/zzz")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Video not found");

    let (status, _) = send(&app, get("/videos?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let (app, _) = app_with(ApiConfig {
        rate_limit_rps: 1,
        ..Default::default()
    });

    let request = || {
        Request::builder()
            .uri("/videos")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&app, request()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["detail"], "Rate limited");

    // Health checks are outside the limited routes.
    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let (app, _) = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
