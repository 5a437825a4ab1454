//! Headless player that plays every track for a fixed length of wall-clock time

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{event_channel, PlayerConnection, PlayerEventSender, PlayerHandle};
use crate::model::PlayerState;

const END_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Position model extrapolated from the last command.
#[derive(Clone)]
struct PlaybackTiming {
    position_secs: f64,
    last_update: Instant,
    is_playing: bool,
    duration_secs: f64,
}

impl PlaybackTiming {
    fn new(duration_secs: f64) -> Self {
        Self {
            position_secs: 0.0,
            last_update: Instant::now(),
            is_playing: false,
            duration_secs,
        }
    }

    fn current_position(&self) -> f64 {
        if self.is_playing {
            let elapsed = self.last_update.elapsed().as_secs_f64();
            (self.position_secs + elapsed).min(self.duration_secs)
        } else {
            self.position_secs.min(self.duration_secs)
        }
    }

    fn set_playing(&mut self, is_playing: bool) {
        self.position_secs = self.current_position();
        self.last_update = Instant::now();
        self.is_playing = is_playing;
    }

    fn seek(&mut self, position_secs: f64) {
        self.position_secs = position_secs.clamp(0.0, self.duration_secs);
        self.last_update = Instant::now();
    }
}

struct SimState {
    track_id: Option<String>,
    timing: PlaybackTiming,
    ended: bool,
}

/// A [`PlayerHandle`] with no audio output.
///
/// Emits `Playing` on play, `Paused` on pause and `Ended` once the position
/// reaches the configured track length.
pub struct SimulatedPlayer {
    state: Arc<Mutex<SimState>>,
    events: PlayerEventSender,
    track_seconds: f64,
    watcher: JoinHandle<()>,
}

impl SimulatedPlayer {
    /// Create a ready player. Must be called inside a tokio runtime.
    pub fn connect(track_seconds: f64) -> PlayerConnection {
        let track_seconds = if track_seconds.is_finite() && track_seconds > 0.0 {
            track_seconds
        } else {
            1.0
        };
        let (events, rx) = event_channel();
        let state = Arc::new(Mutex::new(SimState {
            track_id: None,
            timing: PlaybackTiming::new(0.0),
            ended: false,
        }));

        let watcher = tokio::spawn(watch_for_end(state.clone(), events.clone()));

        tracing::debug!(track_seconds, "Simulated player created");
        PlayerConnection::new(
            Self {
                state,
                events,
                track_seconds,
                watcher,
            },
            rx,
        )
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SimState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    fn emit(&self, state: PlayerState) {
        if self.events.send(state).is_err() {
            tracing::trace!(?state, "No listener for simulated player event");
        }
    }
}

async fn watch_for_end(state: Arc<Mutex<SimState>>, events: PlayerEventSender) {
    let mut ticker = tokio::time::interval(END_CHECK_INTERVAL);
    loop {
        ticker.tick().await;
        let ended = {
            let mut guard = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let timing = &guard.timing;
            let finished = guard.track_id.is_some()
                && !guard.ended
                && timing.is_playing
                && timing.current_position() >= timing.duration_secs;
            if finished {
                guard.timing.set_playing(false);
                guard.ended = true;
            }
            finished
        };

        if ended {
            tracing::debug!("Simulated track ended");
            if events.send(PlayerState::Ended).is_err() {
                break;
            }
        }
    }
}

impl PlayerHandle for SimulatedPlayer {
    fn load(&mut self, track_id: &str) {
        let track_seconds = self.track_seconds;
        self.with_state(|s| {
            s.track_id = Some(track_id.to_string());
            s.timing = PlaybackTiming::new(track_seconds);
            s.ended = false;
        });
        tracing::debug!(track_id, "Simulated player loaded track");
    }

    fn play(&mut self) {
        let started = self.with_state(|s| {
            if s.track_id.is_none() {
                return false;
            }
            if s.ended {
                s.timing.seek(0.0);
                s.ended = false;
            }
            s.timing.set_playing(true);
            true
        });
        if started {
            self.emit(PlayerState::Playing);
        }
    }

    fn pause(&mut self) {
        let paused = self.with_state(|s| {
            if s.track_id.is_none() {
                return false;
            }
            s.timing.set_playing(false);
            true
        });
        if paused {
            self.emit(PlayerState::Paused);
        }
    }

    fn seek_to(&mut self, seconds: f64) {
        self.with_state(|s| {
            s.timing.seek(seconds);
            s.ended = false;
        });
    }

    fn current_time(&self) -> f64 {
        self.with_state(|s| s.timing.current_position())
    }

    fn duration(&self) -> f64 {
        self.with_state(|s| s.timing.duration_secs)
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn play_pause_emit_notifications() {
        let PlayerConnection { mut handle, mut events } = SimulatedPlayer::connect(30.0);

        handle.load("abc");
        handle.play();
        assert_eq!(events.recv().await, Some(PlayerState::Playing));

        tokio::time::advance(Duration::from_secs(10)).await;
        handle.pause();
        assert_eq!(events.recv().await, Some(PlayerState::Paused));

        let position = handle.current_time();
        assert!((position - 10.0).abs() < 0.5, "position was {position}");
        assert_eq!(handle.duration(), 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reaching_the_end_emits_ended_once() {
        let PlayerConnection { mut handle, mut events } = SimulatedPlayer::connect(2.0);

        handle.load("abc");
        handle.play();
        assert_eq!(events.recv().await, Some(PlayerState::Playing));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(events.recv().await, Some(PlayerState::Ended));
        assert_eq!(handle.current_time(), 2.0);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn commands_before_load_are_ignored() {
        let PlayerConnection { mut handle, mut events } = SimulatedPlayer::connect(30.0);

        handle.play();
        handle.pause();

        assert!(events.try_recv().is_err());
        assert_eq!(handle.current_time(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn seek_moves_the_position() {
        let PlayerConnection { mut handle, .. } = SimulatedPlayer::connect(60.0);

        handle.load("abc");
        handle.seek_to(42.0);
        assert_eq!(handle.current_time(), 42.0);

        handle.seek_to(600.0);
        assert_eq!(handle.current_time(), 60.0);
    }
}
