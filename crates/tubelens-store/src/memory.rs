//! In-memory record store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use tubelens_models::{Analysis, Video, VideoId, VideoRecord};

use crate::error::StoreResult;
use crate::RecordStore;

#[derive(Default)]
struct Records {
    by_id: HashMap<VideoId, VideoRecord>,
    order: Vec<VideoId>,
}

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Records>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored videos.
    pub async fn len(&self) -> usize {
        self.records.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn upsert(&self, video: Video, analysis: Option<Analysis>) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let video_id = video.video_id.clone();

        if !records.by_id.contains_key(&video_id) {
            records.order.push(video_id.clone());
        }
        debug!(video_id = %video_id, has_analysis = analysis.is_some(), "Upserting video record");
        records
            .by_id
            .insert(video_id, VideoRecord::new(video, analysis));
        Ok(())
    }

    async fn get(&self, video_id: &VideoId) -> StoreResult<Option<VideoRecord>> {
        Ok(self.records.read().await.by_id.get(video_id).cloned())
    }

    async fn list(&self, skip: usize, limit: usize) -> StoreResult<Vec<VideoRecord>> {
        let records = self.records.read().await;
        Ok(records
            .order
            .iter()
            .skip(skip)
            .take(limit)
            .filter_map(|id| records.by_id.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_overwrites_in_place() {
        let store = InMemoryRecordStore::new();
        store.upsert(Video::new("a", "PL", "A"), None).await.unwrap();
        store.upsert(Video::new("b", "PL", "B"), None).await.unwrap();

        let analysis = Analysis {
            categories: vec!["Music".to_string()],
            ..Default::default()
        };
        store
            .upsert(
                Video::new("a", "PL", "A2").with_transcript("text"),
                Some(analysis.clone()),
            )
            .await
            .unwrap();

        assert_eq!(store.len().await, 2);
        let listed = store.list(0, 10).await.unwrap();
        assert_eq!(listed[0].video.title, "A2");
        assert_eq!(listed[0].analysis, Some(analysis));
        assert_eq!(listed[1].video.title, "B");
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = InMemoryRecordStore::new();
        let found = tokio_test::assert_ok!(store.get(&VideoId::from("nope")).await);
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = InMemoryRecordStore::new();
        for id in ["a", "b", "c"] {
            store.upsert(Video::new(id, "PL", id), None).await.unwrap();
        }

        let page = store.list(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].video_id().as_str(), "b");
        assert!(store.list(5, 10).await.unwrap().is_empty());
    }
}
