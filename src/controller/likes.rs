//! Liked-songs reconciliation against the remote store

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{LikedSongsCache, ToggleStart, Track};
use crate::store::LikedStore;

/// Liked state of one track as the UI should show it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeStatus {
    Liked,
    NotLiked,
    /// Applied locally, waiting for the store. `liked` is the value shown.
    Pending { liked: bool },
}

/// How a like toggle ended.
#[derive(Clone, Debug, PartialEq)]
pub enum LikeOutcome {
    /// The store accepted the change.
    Confirmed { liked: bool },
    /// The change was rolled back; `liked` is the restored value.
    Failed { liked: bool, error: Error },
}

impl LikeOutcome {
    pub fn is_liked(&self) -> bool {
        match self {
            LikeOutcome::Confirmed { liked } | LikeOutcome::Failed { liked, .. } => *liked,
        }
    }
}

/// Keeps the local liked-songs cache in step with a [`LikedStore`].
///
/// The reconciler is the only writer of its cache; views read through the
/// lookup helpers.
#[derive(Clone)]
pub struct LikeReconciler {
    store: Arc<dyn LikedStore>,
    cache: LikedSongsCache,
}

impl LikeReconciler {
    pub fn new(store: Arc<dyn LikedStore>) -> Self {
        Self {
            store,
            cache: LikedSongsCache::new(),
        }
    }

    pub async fn is_liked(&self, user_id: &str, track_id: &str) -> bool {
        self.cache.is_liked(user_id, track_id).await
    }

    pub async fn like_status(&self, user_id: &str, track_id: &str) -> LikeStatus {
        let liked = self.cache.is_liked(user_id, track_id).await;
        match self.cache.pending(track_id).await {
            Some(_) => LikeStatus::Pending { liked },
            None if liked => LikeStatus::Liked,
            None => LikeStatus::NotLiked,
        }
    }

    /// Liked tracks in store order, e.g. to queue the liked-songs view.
    pub async fn liked_tracks(&self) -> Vec<Track> {
        self.cache.tracks().await
    }

    /// Pair search results with their liked flag for rendering.
    pub async fn mark_liked(&self, user_id: &str, tracks: Vec<Track>) -> Vec<(Track, bool)> {
        let mut marked = Vec::with_capacity(tracks.len());
        for track in tracks {
            let liked = self.cache.is_liked(user_id, &track.id).await;
            marked.push((track, liked));
        }
        marked
    }

    /// Replace the cache with the store's list for `user_id`.
    ///
    /// On failure the previous cache is kept.
    pub async fn refresh(&self, user_id: &str) -> Result<usize> {
        tracing::debug!(user_id, "Refreshing liked songs cache from store");
        let result = self.store.list_by_user(user_id).await;
        crate::log_api_result!("list_liked", result);

        let tracks = result?;
        let count = tracks.len();
        self.cache.replace(user_id, tracks).await;
        tracing::info!(user_id, count, "Liked songs cache refreshed");
        Ok(count)
    }

    /// Drop the cache, e.g. on logout.
    pub async fn clear(&self) {
        self.cache.clear().await;
        tracing::debug!("Liked songs cache cleared");
    }

    /// Like `track` if it is not liked, unlike it otherwise.
    ///
    /// The cache changes immediately and shows the track as pending until the
    /// store answers. A store failure rolls the local change back. Requires the
    /// cache to be loaded for `user_id`; a toggle while another one for the same
    /// track is in flight is rejected.
    pub async fn toggle_like(&self, user_id: &str, track: &Track) -> LikeOutcome {
        let (liked, removed_at) = match self.cache.begin_toggle(user_id, track).await {
            ToggleStart::Started { liked, removed_at } => (liked, removed_at),
            ToggleStart::NotLoaded => {
                tracing::warn!(user_id, "Liked songs not loaded for user, ignoring toggle");
                return LikeOutcome::Failed {
                    liked: false,
                    error: Error::NotReady,
                };
            }
            ToggleStart::InFlight { liked } => {
                tracing::debug!(track_id = %track.id, "Like toggle already in flight");
                return LikeOutcome::Failed {
                    liked,
                    error: Error::NotReady,
                };
            }
        };
        tracing::debug!(user_id, track_id = %track.id, liked, "Toggling liked status");

        let result = if liked {
            self.store.add(user_id, track).await
        } else {
            self.store.remove(user_id, &track.id).await
        };
        let operation = if liked { "add_liked" } else { "remove_liked" };
        crate::log_api_result!(operation, result);

        if self.cache.owner().await.as_deref() != Some(user_id) {
            tracing::debug!(user_id, "Cache changed owner while toggle was in flight");
            return match result {
                Ok(()) => LikeOutcome::Confirmed { liked },
                Err(error) => LikeOutcome::Failed {
                    liked: !liked,
                    error,
                },
            };
        }

        match result {
            Ok(()) => {
                self.cache.confirm_toggle(&track.id).await;
                let status = if liked { "added to" } else { "removed from" };
                tracing::info!(track_id = %track.id, status, "Track liked status toggled");
                LikeOutcome::Confirmed { liked }
            }
            Err(error) => {
                self.cache.rollback_toggle(&track.id, removed_at).await;
                LikeOutcome::Failed {
                    liked: !liked,
                    error,
                }
            }
        }
    }
}
