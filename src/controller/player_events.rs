//! Player notification handling and the progress poller

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::model::{PlayerState, TransportState};
use crate::player::PlayerEventChannel;

use super::session::SessionSnapshot;
use super::PlaybackQueueController;

impl PlaybackQueueController {
    /// Apply a state notification from the player.
    ///
    /// Notifications are applied in arrival order without deduplication. An
    /// ended track always advances, wrapping to the first track after the last.
    pub fn on_external_state_change(&mut self, state: PlayerState) {
        if self.state.current_index.is_none() {
            tracing::debug!(?state, "Ignoring player notification while idle");
            return;
        }

        match state {
            PlayerState::Playing => {
                tracing::trace!("PlayerState::Playing");
                self.state.is_playing = true;
                self.state.transport = TransportState::Playing;
                self.state.pending_intent = None;
                if let Some(player) = self.player.as_ref() {
                    self.state.set_duration(player.duration());
                }
            }
            PlayerState::Paused => {
                tracing::debug!("PlayerState::Paused");
                self.state.is_playing = false;
                self.state.transport = TransportState::Paused;
                self.state.pending_intent = None;
            }
            PlayerState::Ended => {
                tracing::debug!("PlayerState::Ended");
                if let Err(e) = self.next() {
                    tracing::warn!(error = %e, "Could not advance after track ended");
                    self.state.is_playing = false;
                    self.state.transport = TransportState::Paused;
                }
            }
        }
    }
}

/// Forward player notifications into the controller until the channel closes
/// or the controller is gone.
pub(crate) fn spawn_event_listener(
    controller: Weak<Mutex<PlaybackQueueController>>,
    mut events: PlayerEventChannel,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
) -> JoinHandle<()> {
    tracing::info!("Starting player event listener");

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(controller) = controller.upgrade() else {
                tracing::debug!("Player event listener shutting down");
                break;
            };

            let mut guard = controller.lock().await;
            guard.on_external_state_change(event);
            snapshots.send_replace(SessionSnapshot::of(&guard));
        }
        tracing::debug!("Player event channel closed");
    })
}

/// Poll the player's position every `interval`.
pub(crate) fn spawn_progress_poller(
    controller: Weak<Mutex<PlaybackQueueController>>,
    interval: Duration,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(controller) = controller.upgrade() else {
                break;
            };

            let mut guard = controller.lock().await;
            if guard.poll_progress().is_ok() {
                snapshots.send_if_modified(|current| {
                    let next = SessionSnapshot::of(&guard);
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
            }
        }
    })
}
