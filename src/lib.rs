//! Playback queue, liked-songs reconciliation and catalog search for a
//! video-backed music player.
//!
//! - `model`: tracks, playback state and the liked-songs cache
//! - `controller`: the queue controller, like reconciler and session lifecycle
//! - `player`: the player handle abstraction and a headless player
//! - `catalog`: catalog search (YouTube)
//! - `store`: liked-songs persistence
//! - `config`, `logging`: ambient setup for hosts

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod player;
pub mod store;

pub use catalog::{search_or_empty, CatalogSearch, YouTubeSearch};
pub use config::AppConfig;
pub use controller::{
    LikeOutcome, LikeReconciler, LikeStatus, PlaybackQueueController, PlaybackSession,
    SessionHandle, SessionSnapshot,
};
pub use error::{Error, Result};
pub use model::{PlaybackState, PlayerState, Track, TransportIntent, TransportState};
pub use player::{PlayerConnection, PlayerHandle, SimulatedPlayer};
pub use store::{InMemoryLikedStore, JsonLikedStore, LikedRecord, LikedStore};
