//! Controller module - Playback queue logic and event handling
//!
//! - `playback`: Queue and transport operations (select, next, seek, ...)
//! - `player_events`: Player notification handling and the progress poller
//! - `session`: Scoped ownership of a controller for one mounted view
//! - `likes`: Liked-songs reconciliation against the remote store

mod playback;
mod player_events;
mod session;
mod likes;

use crate::error::Error;
use crate::model::{PlaybackState, Track};
use crate::player::PlayerHandle;

pub use likes::{LikeOutcome, LikeReconciler, LikeStatus};
pub use session::{PlaybackSession, SessionHandle, SessionSnapshot, DEFAULT_POLL_INTERVAL};

/// Owns the queue for one browsing session and drives a single player handle.
///
/// Commands are applied to the local state first (see [`PlaybackState`]) and
/// reconciled when the player reports back through
/// [`PlaybackQueueController::on_external_state_change`].
pub struct PlaybackQueueController {
    queue: Vec<Track>,
    state: PlaybackState,
    player: Option<Box<dyn PlayerHandle>>,
}

impl Default for PlaybackQueueController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackQueueController {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            state: PlaybackState::default(),
            player: None,
        }
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_index.and_then(|i| self.queue.get(i))
    }

    pub fn is_player_ready(&self) -> bool {
        self.player.is_some()
    }

    /// Hand the controller its player once the backend is ready.
    ///
    /// A controller drives exactly one player; attaching a new one replaces
    /// (and drops) the previous handle.
    pub fn attach_player(&mut self, player: Box<dyn PlayerHandle>) {
        if self.player.replace(player).is_some() {
            tracing::debug!("Replaced previously attached player");
        } else {
            tracing::debug!("Player attached");
        }
    }

    pub fn detach_player(&mut self) -> Option<Box<dyn PlayerHandle>> {
        let player = self.player.take();
        if player.is_some() {
            tracing::debug!("Player detached");
        }
        player
    }

    /// Replace the queue. Playback state is reset; the player is not touched
    /// until a track is selected.
    pub fn set_queue(&mut self, tracks: Vec<Track>) {
        tracing::info!(count = tracks.len(), "Queue replaced");
        self.queue = tracks;
        self.state.reset();
    }

    fn player_mut(&mut self) -> Result<&mut Box<dyn PlayerHandle>, Error> {
        self.player.as_mut().ok_or(Error::PlayerNotReady)
    }

    /// Format errors as short user-facing messages.
    pub fn format_error(error: &Error) -> String {
        match error {
            Error::SearchFailed { .. } => "Search failed. Please try again.".to_string(),
            Error::StoreUnavailable { .. } => {
                "Could not reach your liked songs. Changes may not be saved.".to_string()
            }
            Error::PlayerNotReady => "Player is still loading.".to_string(),
            Error::NotReady => "Nothing is playing.".to_string(),
            Error::OutOfRange { .. } => "That track is no longer in the list.".to_string(),
            Error::InvalidSeek { .. } => "Cannot seek there.".to_string(),
            Error::Config { message } => format!("Configuration error: {}", message),
        }
    }
}
