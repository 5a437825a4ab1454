//! Observable playback state of the queue controller

use super::types::{TransportIntent, TransportState};

/// Snapshot of what the controller believes the player is doing.
///
/// `current_index` always points into the controller's queue when set and
/// `progress_seconds` never leaves `[0, duration_seconds]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub progress_seconds: f64,
    pub duration_seconds: f64,
    pub transport: TransportState,
    /// Set by optimistic play/pause changes until a notification confirms them.
    pub pending_intent: Option<TransportIntent>,
    /// Number of loads issued so far. Survives [`PlaybackState::reset`] so a
    /// replay of the same index still counts as a new track start.
    pub loads: u64,
}

impl PlaybackState {
    pub fn is_idle(&self) -> bool {
        self.transport == TransportState::Idle
    }

    pub fn set_duration(&mut self, duration_seconds: f64) {
        self.duration_seconds = sanitize_seconds(duration_seconds);
        self.progress_seconds = self.progress_seconds.min(self.duration_seconds);
    }

    pub fn set_progress(&mut self, progress_seconds: f64) {
        self.progress_seconds = sanitize_seconds(progress_seconds).min(self.duration_seconds);
    }

    /// Forget everything about the current track, keeping nothing selected.
    pub fn reset(&mut self) {
        *self = Self {
            loads: self.loads,
            ..Self::default()
        };
    }

    /// Prepare for a freshly loaded track at `index`.
    pub fn begin_loading(&mut self, index: usize) {
        self.current_index = Some(index);
        self.is_playing = true;
        self.progress_seconds = 0.0;
        self.duration_seconds = 0.0;
        self.transport = TransportState::Loading;
        self.pending_intent = Some(TransportIntent::Play);
        self.loads += 1;
    }

    /// Fraction of the track already played, for progress bars.
    pub fn progress_ratio(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            self.progress_seconds / self.duration_seconds
        } else {
            0.0
        }
    }
}

fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}
