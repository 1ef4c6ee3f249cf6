//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Install the Prometheus recorder.
///
/// Worker metrics recorded through the `metrics` facade are exported by the
/// same handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "tubelens_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tubelens_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tubelens_http_requests_in_flight";

    pub const TASKS_SUBMITTED_TOTAL: &str = "tubelens_tasks_submitted_total";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "tubelens_rate_limit_hits_total";
}

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static VIDEO_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/videos/[A-Za-z0-9_-]+").unwrap());

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted playlist.
pub fn record_task_submitted() {
    counter!(names::TASKS_SUBMITTED_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Replace task and video IDs with placeholders to bound label cardinality.
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, ":task_id");
    VIDEO_SEGMENT
        .replace_all(&path, "/videos/:video_id")
        .into_owned()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/status/550e8400-e29b-41d4-a716-446655440000"),
            "/status/:task_id"
        );
        assert_eq!(sanitize_path("/videos/dQw4w9WgXcQ"), "/videos/:video_id");
        assert_eq!(sanitize_path("/videos"), "/videos");
        assert_eq!(sanitize_path("/process"), "/process");
    }
}
