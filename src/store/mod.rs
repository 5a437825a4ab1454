//! Liked-songs persistence
//!
//! - `json`: single-file JSON store
//! - `memory`: in-process store without persistence

mod json;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::Track;

pub use json::JsonLikedStore;
pub use memory::InMemoryLikedStore;

/// Remote set of liked tracks keyed by `(user, track id)`.
#[async_trait]
pub trait LikedStore: Send + Sync {
    /// Record `track` as liked by `user_id`. Liking twice keeps one record.
    async fn add(&self, user_id: &str, track: &Track) -> Result<()>;

    /// Forget a like. Removing a track that is not liked succeeds.
    async fn remove(&self, user_id: &str, track_id: &str) -> Result<()>;

    /// All tracks liked by `user_id`, oldest like first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Track>>;
}

/// Persisted layout of one like: one record per liked track per user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedRecord {
    pub id: Uuid,
    pub user_id: String,
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_at: Option<DateTime<Utc>>,
}

impl LikedRecord {
    pub fn new(user_id: &str, track: &Track) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            video_id: track.id.clone(),
            title: track.title.clone(),
            channel_title: track.channel_title.clone(),
            thumbnail: track.thumbnail_url.clone(),
            liked_at: Some(Utc::now()),
        }
    }

    pub fn to_track(&self) -> Track {
        Track {
            id: self.video_id.clone(),
            title: self.title.clone(),
            channel_title: self.channel_title.clone(),
            thumbnail_url: self.thumbnail.clone(),
        }
    }
}

/// Record list with the `(user_id, video_id)` uniqueness rule applied.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct LikedRecords(Vec<LikedRecord>);

impl LikedRecords {
    fn contains(&self, user_id: &str, video_id: &str) -> bool {
        self.0
            .iter()
            .any(|r| r.user_id == user_id && r.video_id == video_id)
    }

    /// Returns false when the pair was already present.
    pub(crate) fn add(&mut self, user_id: &str, track: &Track) -> bool {
        if self.contains(user_id, &track.id) {
            return false;
        }
        self.0.push(LikedRecord::new(user_id, track));
        true
    }

    /// Returns false when nothing matched.
    pub(crate) fn remove(&mut self, user_id: &str, video_id: &str) -> bool {
        let before = self.0.len();
        self.0
            .retain(|r| !(r.user_id == user_id && r.video_id == video_id));
        self.0.len() != before
    }

    pub(crate) fn list_by_user(&self, user_id: &str) -> Vec<Track> {
        self.0
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(LikedRecord::to_track)
            .collect()
    }

    pub(crate) fn records(&self) -> &[LikedRecord] {
        &self.0
    }
}
