//! YouTube Data API v3 playlist listing.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use tubelens_models::PlaylistVideo;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::retry::{retry_async, RetryConfig};
use crate::sources::VideoLister;

/// Items requested per page (the API maximum).
const PAGE_SIZE: u32 = 50;

/// Header carrying the API key, kept out of the URL so errors never echo it.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// YouTube Data API client.
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    client: Client,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    video_id: Option<String>,
}

impl PlaylistItem {
    fn into_playlist_video(self) -> Option<PlaylistVideo> {
        let from_snippet = self
            .snippet
            .as_ref()
            .and_then(|s| s.resource_id.as_ref())
            .and_then(|r| r.video_id.clone());
        let video_id = self
            .content_details
            .and_then(|c| c.video_id)
            .or(from_snippet)
            .filter(|id| !id.is_empty())?;
        let title = self
            .snippet
            .and_then(|s| s.title)
            .filter(|t| !t.trim().is_empty());
        Some(PlaylistVideo::new(video_id, title))
    }
}

impl YouTubeClient {
    /// Create a client from worker configuration.
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let api_key = config
            .youtube_api_key
            .clone()
            .ok_or_else(|| WorkerError::config_error("YOUTUBE_API_KEY not set"))?;

        let client = Client::builder()
            .timeout(config.listing_timeout)
            .build()
            .map_err(|e| WorkerError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: config.youtube_api_base.trim_end_matches('/').to_string(),
            client,
            retry: config.retry_config().named("youtube playlistItems"),
        })
    }

    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> WorkerResult<PlaylistItemsResponse> {
        let url = format!("{}/playlistItems", self.base_url);
        let max_results = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                WorkerError::transient_fetch(format!(
                    "YouTube API request failed: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, playlist_id, body.trim()));
        }

        response.json().await.map_err(|e| {
            WorkerError::invalid_playlist(format!(
                "Unreadable playlist response: {}",
                e.without_url()
            ))
        })
    }
}

#[async_trait]
impl VideoLister for YouTubeClient {
    async fn list(&self, playlist_id: &str) -> WorkerResult<Vec<PlaylistVideo>> {
        info!(playlist_id = %playlist_id, "Fetching playlist items");
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = page_token.as_deref();
            let page = retry_async(&self.retry, WorkerError::is_retryable, || async move {
                self.fetch_page(playlist_id, token).await
            })
            .await
            .into_result()
            .map_err(|e| match e {
                WorkerError::TransientFetch(msg) => WorkerError::invalid_playlist(format!(
                    "playlist {} could not be fetched: {}",
                    playlist_id, msg
                )),
                other => other,
            })?;

            let count = page.items.len();
            videos.extend(
                page.items
                    .into_iter()
                    .filter_map(PlaylistItem::into_playlist_video),
            );
            debug!(
                "Fetched {} items, {} videos collected so far",
                count,
                videos.len()
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(playlist_id = %playlist_id, videos = videos.len(), "Playlist listed");
        Ok(videos)
    }
}

fn classify_status(status: StatusCode, playlist_id: &str, body: &str) -> WorkerError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        WorkerError::transient_fetch(format!("YouTube API returned {}: {}", status, body))
    } else {
        WorkerError::invalid_playlist(format!(
            "YouTube API returned {} for playlist {}: {}",
            status, playlist_id, body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> YouTubeClient {
        let config = WorkerConfig {
            youtube_api_key: Some("yt-key".to_string()),
            youtube_api_base: server.uri(),
            max_retries: 1,
            retry_base_delay: Duration::from_millis(1),
            ..Default::default()
        };
        YouTubeClient::new(&config).unwrap()
    }

    fn item(video_id: &str, title: &str) -> serde_json::Value {
        json!({
            "snippet": {"title": title, "resourceId": {"videoId": video_id}},
            "contentDetails": {"videoId": video_id}
        })
    }

    #[tokio::test]
    async fn test_list_follows_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .and(query_param("playlistId", "PL1"))
            .and(query_param("pageToken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item("c", "Third")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .and(query_param("playlistId", "PL1"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item("a", "First"), item("b", "")],
                "nextPageToken": "page2"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let videos = client_for(&server).list("PL1").await.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(videos[0].display_title(), "First");
        assert_eq!(videos[1].display_title(), tubelens_models::UNKNOWN_TITLE);
    }

    #[tokio::test]
    async fn test_not_found_is_invalid_playlist() {
        let server = MockServer::start().await;
        Mock::given(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(404).set_body_string("playlistNotFound"))
            .mount(&server)
            .await;

        let err = client_for(&server).list("PLmissing").await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidPlaylist(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_server_errors_retry_then_fail_invalid() {
        let server = MockServer::start().await;
        Mock::given(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = client_for(&server).list("PL1").await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidPlaylist(_)));
    }

    #[tokio::test]
    async fn test_empty_playlist() {
        let server = MockServer::start().await;
        Mock::given(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        assert!(client_for(&server).list("PL1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_key_sent_as_header_not_query() {
        let server = MockServer::start().await;
        Mock::given(path("/playlistItems"))
            .and(header("x-goog-api-key", "yt-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item("a", "First")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let videos = client_for(&server).list("PL1").await.unwrap();
        assert_eq!(videos.len(), 1);

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default();
        assert!(!query.contains("yt-key"), "key leaked into query: {}", query);
    }

    #[tokio::test]
    async fn test_unreachable_api_error_does_not_expose_key() {
        let config = WorkerConfig {
            youtube_api_key: Some("SECRET-YT-KEY".to_string()),
            youtube_api_base: "http://127.0.0.1:1".to_string(),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(1),
            listing_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let client = YouTubeClient::new(&config).unwrap();

        let err = client.list("PL1").await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidPlaylist(_)), "got {:?}", err);
        let message = err.to_string();
        assert!(!message.contains("SECRET-YT-KEY"), "key leaked: {}", message);
        assert!(!message.contains("127.0.0.1:1/"), "url leaked: {}", message);
    }
}
