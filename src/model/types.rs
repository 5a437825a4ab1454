//! Core type definitions for the playback queue

use std::hash::{Hash, Hasher};

/// A playable item returned by the catalog or read back from the liked store.
///
/// Two tracks are the same track when their ids match; the descriptive fields
/// are carried along for display only.
#[derive(Clone, Debug)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail_url: String,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        channel_title: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel_title: channel_title.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Discrete state notifications emitted by a player handle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    Ended,
}

/// Transport phase of the queue controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No track selected.
    #[default]
    Idle,
    /// A load was issued and the player has not reported back yet.
    Loading,
    Playing,
    Paused,
}

/// A play/pause request applied locally before the player confirmed it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportIntent {
    Play,
    Pause,
}
