//! Model module - Playback data types and state
//!
//! - `types`: Core type definitions (tracks, player notifications, transport phases)
//! - `playback`: Observable playback state of the queue controller
//! - `cache`: Liked songs cache for fast lookup

mod types;
mod playback;
mod cache;

pub use types::{PlayerState, Track, TransportIntent, TransportState};

pub use playback::PlaybackState;

pub use cache::LikedSongsCache;
pub(crate) use cache::ToggleStart;
