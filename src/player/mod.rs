//! Player handle abstraction
//!
//! The queue controller never talks to a concrete media backend. It drives a
//! [`PlayerHandle`] and listens to the [`PlayerState`] notifications the
//! backend pushes through a [`PlayerEventChannel`].
//!
//! - `simulated`: headless, clock-driven player used by the CLI

mod simulated;

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::model::PlayerState;

pub use simulated::SimulatedPlayer;

/// Commands understood by an embedded media player.
///
/// Commands are fire-and-forget: the outcome is observed through the state
/// notifications, not through return values.
pub trait PlayerHandle: Send {
    fn load(&mut self, track_id: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
}

pub type PlayerEventSender = mpsc::UnboundedSender<PlayerState>;
pub type PlayerEventChannel = mpsc::UnboundedReceiver<PlayerState>;

pub fn event_channel() -> (PlayerEventSender, PlayerEventChannel) {
    mpsc::unbounded_channel()
}

/// A ready player: the command handle plus its notification stream.
pub struct PlayerConnection {
    pub handle: Box<dyn PlayerHandle>,
    pub events: PlayerEventChannel,
}

impl PlayerConnection {
    pub fn new(handle: impl PlayerHandle + 'static, events: PlayerEventChannel) -> Self {
        Self {
            handle: Box::new(handle),
            events,
        }
    }
}

/// Keep calling `connect` until the backend is ready.
///
/// Player backends usually come up asynchronously (a script still loading, a
/// device still registering). Each failed attempt waits `interval` before the
/// next one; after `attempts` failures the result is [`Error::PlayerNotReady`].
pub async fn connect_with_retry<F, Fut>(
    mut connect: F,
    interval: Duration,
    attempts: u32,
) -> Result<PlayerConnection>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PlayerConnection>>,
{
    for attempt in 1..=attempts.max(1) {
        match connect().await {
            Ok(connection) => {
                tracing::info!(attempt, "Player ready");
                return Ok(connection);
            }
            Err(e) => {
                tracing::debug!(attempt, error = %e, "Player not ready yet");
                if attempt < attempts {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    tracing::warn!(attempts, "Player did not become ready");
    Err(Error::PlayerNotReady)
}
