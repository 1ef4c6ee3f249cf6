//! SQLite record store.
//!
//! One row per video keyed by `video_id`. The analysis is embedded as a JSON
//! column so a video without analysis is simply a NULL there.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

use tubelens_models::{Analysis, Video, VideoId, VideoRecord};

use crate::error::{StoreError, StoreResult};
use crate::RecordStore;

const CREATE_VIDEOS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS videos (
        video_id TEXT PRIMARY KEY,
        playlist_id TEXT NOT NULL,
        title TEXT NOT NULL,
        has_transcript INTEGER NOT NULL DEFAULT 0,
        transcript TEXT,
        fetch_timestamp TEXT NOT NULL,
        analysis TEXT
    )
"#;

const CREATE_PLAYLIST_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_videos_playlist_id ON videos (playlist_id)";

const UPSERT_VIDEO: &str = r#"
    INSERT INTO videos (video_id, playlist_id, title, has_transcript, transcript, fetch_timestamp, analysis)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(video_id) DO UPDATE SET
        playlist_id = excluded.playlist_id,
        title = excluded.title,
        has_transcript = excluded.has_transcript,
        transcript = excluded.transcript,
        fetch_timestamp = excluded.fetch_timestamp,
        analysis = excluded.analysis
"#;

const SELECT_COLUMNS: &str =
    "SELECT video_id, playlist_id, title, has_transcript, transcript, fetch_timestamp, analysis FROM videos";

/// SQLite-backed [`RecordStore`].
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: Pool<Sqlite>,
}

impl SqliteRecordStore {
    /// Open (creating if needed) a database file and ensure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!(path = ?path, "Opened SQLite record store");
        Self::from_pool(pool).await
    }

    /// A private in-memory database, useful for tests.
    ///
    /// Every SQLite memory connection is its own database, so the pool is
    /// limited to one connection.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run schema setup.
    pub async fn from_pool(pool: Pool<Sqlite>) -> StoreResult<Self> {
        sqlx::query(CREATE_VIDEOS_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_PLAYLIST_INDEX).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn upsert(&self, video: Video, analysis: Option<Analysis>) -> StoreResult<()> {
        let analysis_json = analysis.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(UPSERT_VIDEO)
            .bind(video.video_id.as_str())
            .bind(&video.playlist_id)
            .bind(&video.title)
            .bind(video.has_transcript)
            .bind(video.transcript.as_deref())
            .bind(video.fetch_timestamp.to_rfc3339())
            .bind(analysis_json)
            .execute(&self.pool)
            .await?;

        debug!(video_id = %video.video_id, "Upserted video row");
        Ok(())
    }

    async fn get(&self, video_id: &VideoId) -> StoreResult<Option<VideoRecord>> {
        let row = sqlx::query(&format!("{} WHERE video_id = ?", SELECT_COLUMNS))
            .bind(video_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn list(&self, skip: usize, limit: usize) -> StoreResult<Vec<VideoRecord>> {
        let rows = sqlx::query(&format!("{} ORDER BY rowid LIMIT ? OFFSET ?", SELECT_COLUMNS))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(skip).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: &SqliteRow) -> StoreResult<VideoRecord> {
    let video_id: String = row.try_get("video_id")?;
    let fetched_at: String = row.try_get("fetch_timestamp")?;
    let fetch_timestamp = DateTime::parse_from_rfc3339(&fetched_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::invalid_record(&video_id, format!("bad fetch_timestamp: {}", e)))?;

    let analysis: Option<String> = row.try_get("analysis")?;
    let analysis = analysis
        .map(|json| serde_json::from_str::<Analysis>(&json))
        .transpose()?;

    let video = Video {
        video_id: VideoId::from(video_id),
        playlist_id: row.try_get("playlist_id")?,
        title: row.try_get("title")?,
        has_transcript: row.try_get("has_transcript")?,
        transcript: row.try_get("transcript")?,
        fetch_timestamp,
    };

    Ok(VideoRecord::new(video, analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubelens_models::Verdict;

    fn sample_analysis() -> Analysis {
        Analysis {
            core_topic: Some("Rust ownership".to_string()),
            summary: Some("Borrowing explained".to_string()),
            structure: None,
            takeaways: vec!["Moves transfer ownership".to_string()],
            categories: vec!["Technology".to_string(), "Tutorial".to_string()],
            verdict: Some(Verdict::WorthWatching),
            justification: Some("Clear examples".to_string()),
        }
    }

    #[tokio::test]
    async fn test_round_trip_with_analysis() {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        let video = Video::new("vid1", "PL1", "Ownership").with_transcript("hello");

        store
            .upsert(video.clone(), Some(sample_analysis()))
            .await
            .unwrap();

        let record = store.get(&VideoId::from("vid1")).await.unwrap().unwrap();
        assert_eq!(record.video.title, "Ownership");
        assert!(record.video.has_transcript);
        assert_eq!(record.video.transcript.as_deref(), Some("hello"));
        assert_eq!(record.analysis, Some(sample_analysis()));
    }

    #[tokio::test]
    async fn test_upsert_replaces_analysis() {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        store
            .upsert(Video::new("vid1", "PL1", "T"), Some(sample_analysis()))
            .await
            .unwrap();
        store
            .upsert(Video::new("vid1", "PL2", "T2"), None)
            .await
            .unwrap();

        let records = store.list(0, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].video.playlist_id, "PL2");
        assert!(records[0].analysis.is_none());
        assert!(!records[0].video.has_transcript);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        for id in ["c", "a", "b"] {
            store.upsert(Video::new(id, "PL", id), None).await.unwrap();
        }
        store.upsert(Video::new("c", "PL", "c2"), None).await.unwrap();

        let ids: Vec<String> = store
            .list(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.video.video_id.0)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let page = store.list(1, 1).await.unwrap();
        assert_eq!(page[0].video.video_id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("videos.db");

        let store = SqliteRecordStore::open(&path).await.unwrap();
        store.upsert(Video::new("x", "PL", "X"), None).await.unwrap();

        assert!(path.exists());
        assert!(store.get(&VideoId::from("x")).await.unwrap().is_some());
    }
}
