//! In-process liked-songs store

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{LikedRecords, LikedStore};
use crate::error::Result;
use crate::model::Track;

/// Keeps likes in memory for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryLikedStore {
    records: Mutex<LikedRecords>,
}

impl InMemoryLikedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LikedStore for InMemoryLikedStore {
    async fn add(&self, user_id: &str, track: &Track) -> Result<()> {
        self.records.lock().await.add(user_id, track);
        Ok(())
    }

    async fn remove(&self, user_id: &str, track_id: &str) -> Result<()> {
        self.records.lock().await.remove(user_id, track_id);
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Track>> {
        Ok(self.records.lock().await.list_by_user(user_id))
    }
}
