//! Local mirror of one user's liked songs for fast lookup without store calls

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::Track;

#[derive(Default)]
struct CacheInner {
    owner: Option<String>,
    tracks: Vec<Track>,
    ids: HashSet<String>,
    /// Track id -> liked value applied locally but not yet confirmed by the store.
    pending: HashMap<String, bool>,
}

/// Liked-songs cache shared between the reconciler (the only writer) and any
/// number of readers.
#[derive(Clone, Default)]
pub struct LikedSongsCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl LikedSongsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn owner(&self) -> Option<String> {
        self.inner.read().await.owner.clone()
    }

    pub async fn is_liked(&self, user_id: &str, track_id: &str) -> bool {
        let inner = self.inner.read().await;
        inner.owner.as_deref() == Some(user_id) && inner.ids.contains(track_id)
    }

    pub async fn pending(&self, track_id: &str) -> Option<bool> {
        self.inner.read().await.pending.get(track_id).copied()
    }

    pub async fn tracks(&self) -> Vec<Track> {
        self.inner.read().await.tracks.clone()
    }

    pub(crate) async fn replace(&self, user_id: &str, tracks: Vec<Track>) {
        let mut inner = self.inner.write().await;
        let mut ids = HashSet::with_capacity(tracks.len());
        let tracks: Vec<Track> = tracks
            .into_iter()
            .filter(|track| ids.insert(track.id.clone()))
            .collect();
        inner.owner = Some(user_id.to_string());
        inner.tracks = tracks;
        inner.ids = ids;
        inner.pending.clear();
    }

    pub(crate) async fn clear(&self) {
        *self.inner.write().await = CacheInner::default();
    }

    /// Flip `track` locally and mark it pending, all under one write lock.
    pub(crate) async fn begin_toggle(&self, user_id: &str, track: &Track) -> ToggleStart {
        let mut inner = self.inner.write().await;
        if inner.owner.as_deref() != Some(user_id) {
            return ToggleStart::NotLoaded;
        }

        let was_liked = inner.ids.contains(&track.id);
        if inner.pending.contains_key(&track.id) {
            return ToggleStart::InFlight { liked: was_liked };
        }

        let removed_at = if was_liked {
            inner.ids.remove(&track.id);
            let position = inner.tracks.iter().position(|t| t.id == track.id);
            position.map(|position| (position, inner.tracks.remove(position)))
        } else {
            inner.ids.insert(track.id.clone());
            inner.tracks.push(track.clone());
            None
        };
        inner.pending.insert(track.id.clone(), !was_liked);

        ToggleStart::Started {
            liked: !was_liked,
            removed_at,
        }
    }

    /// The store accepted the toggle.
    pub(crate) async fn confirm_toggle(&self, track_id: &str) {
        self.inner.write().await.pending.remove(track_id);
    }

    /// The store rejected the toggle: undo the local flip.
    pub(crate) async fn rollback_toggle(
        &self,
        track_id: &str,
        removed_at: Option<(usize, Track)>,
    ) {
        let mut inner = self.inner.write().await;
        inner.pending.remove(track_id);
        match removed_at {
            Some((position, track)) => {
                if inner.ids.insert(track.id.clone()) {
                    let position = position.min(inner.tracks.len());
                    inner.tracks.insert(position, track);
                }
            }
            None => {
                if inner.ids.remove(track_id) {
                    inner.tracks.retain(|t| t.id != track_id);
                }
            }
        }
    }
}

/// Result of starting a like toggle locally.
#[derive(Debug)]
pub(crate) enum ToggleStart {
    /// The cache does not belong to the user.
    NotLoaded,
    /// Another toggle for this track is waiting on the store.
    InFlight { liked: bool },
    /// Applied locally; `removed_at` is where an unliked track used to be.
    Started {
        liked: bool,
        removed_at: Option<(usize, Track)>,
    },
}
