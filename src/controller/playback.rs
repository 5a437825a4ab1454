//! Queue and transport operations

use crate::error::{Error, Result};
use crate::model::{TransportIntent, TransportState};

use super::PlaybackQueueController;

impl PlaybackQueueController {
    /// Load and start the track at `index`.
    ///
    /// Playback is marked as running straight away; the next PLAYING/PAUSED
    /// notification corrects it. Fails without touching any state when the
    /// index is outside the queue or no player is attached.
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        let len = self.queue.len();
        if index >= len {
            tracing::warn!(index, len, "Track index out of range");
            return Err(Error::OutOfRange { index, len });
        }

        let track_id = self.queue[index].id.clone();
        let player = self.player_mut()?;
        player.load(&track_id);
        player.play();

        self.state.begin_loading(index);
        tracing::info!(index, track_id = %track_id, "Track selected");
        Ok(())
    }

    /// Pause when playing, play otherwise. The flag flips immediately and is
    /// tagged pending until the player confirms.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state.current_index.is_none() {
            return Err(Error::NotReady);
        }

        let is_playing = self.state.is_playing;
        tracing::debug!(is_playing, "Toggling playback");

        let player = self.player_mut()?;
        if is_playing {
            player.pause();
        } else {
            player.play();
        }

        self.state.is_playing = !is_playing;
        self.state.pending_intent = Some(if is_playing {
            TransportIntent::Pause
        } else {
            TransportIntent::Play
        });
        Ok(())
    }

    /// Advance to the following track, wrapping from the last track to the first.
    pub fn next(&mut self) -> Result<()> {
        let index = self.step_index(1)?;
        tracing::debug!(index, "Skipping to next track");
        self.select_track(index)
    }

    /// Go back one track, wrapping from the first track to the last.
    pub fn previous(&mut self) -> Result<()> {
        let index = self.step_index(-1)?;
        tracing::debug!(index, "Skipping to previous track");
        self.select_track(index)
    }

    fn step_index(&self, step: isize) -> Result<usize> {
        let len = self.queue.len();
        match self.state.current_index {
            Some(current) if len > 0 => {
                Ok((current as isize + step).rem_euclid(len as isize) as usize)
            }
            _ => Err(Error::NotReady),
        }
    }

    /// Jump to `target_seconds` in the current track.
    pub fn seek(&mut self, target_seconds: f64) -> Result<()> {
        let duration = self.state.duration_seconds;
        if !(0.0..=duration).contains(&target_seconds) {
            return Err(Error::InvalidSeek {
                target: target_seconds,
                duration,
            });
        }
        if self.state.current_index.is_none() {
            return Err(Error::NotReady);
        }

        self.player_mut()?.seek_to(target_seconds);
        self.state.set_progress(target_seconds);
        tracing::debug!(target_seconds, "Seeked");
        Ok(())
    }

    /// Read position and length from the player. Meant to be called on a
    /// fixed cadence; the player never pushes progress on its own.
    pub fn poll_progress(&mut self) -> Result<()> {
        let player = self.player.as_ref().ok_or(Error::PlayerNotReady)?;
        if self.state.transport == TransportState::Idle {
            return Ok(());
        }

        let current_time = player.current_time();
        let duration = player.duration();
        self.state.set_duration(duration);
        self.state.set_progress(current_time);
        tracing::trace!(current_time, duration, "Progress polled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::controller::PlaybackQueueController;
    use crate::error::Error;
    use crate::model::{PlayerState, Track, TransportIntent, TransportState};
    use crate::player::testing::{Command, RecordingPlayer};

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track::new(*id, format!("Song {id}"), "Channel", ""))
            .collect()
    }

    fn controller_with(ids: &[&str]) -> (PlaybackQueueController, RecordingPlayer) {
        let player = RecordingPlayer::new();
        let mut controller = PlaybackQueueController::new();
        controller.attach_player(Box::new(player.clone()));
        controller.set_queue(tracks(ids));
        (controller, player)
    }

    #[test]
    fn select_track_loads_then_plays() {
        let (mut controller, player) = controller_with(&["a", "b", "c"]);

        controller.select_track(1).unwrap();

        assert_eq!(
            player.commands(),
            vec![Command::Load("b".to_string()), Command::Play]
        );
        let state = controller.state();
        assert_eq!(state.current_index, Some(1));
        assert!(state.is_playing);
        assert_eq!(state.transport, TransportState::Loading);
        assert_eq!(controller.current_track().unwrap().id, "b");
    }

    #[test]
    fn out_of_range_selection_changes_nothing() {
        let (mut controller, player) = controller_with(&["a", "b", "c"]);
        controller.select_track(2).unwrap();
        player.clear();

        for index in [3, 4, usize::MAX] {
            let err = controller.select_track(index).unwrap_err();
            assert_eq!(err, Error::OutOfRange { index, len: 3 });
        }

        assert_eq!(controller.state().current_index, Some(2));
        assert!(player.commands().is_empty());
    }

    #[test]
    fn select_without_player_is_dropped() {
        let mut controller = PlaybackQueueController::new();
        controller.set_queue(tracks(&["a"]));

        assert_eq!(controller.select_track(0), Err(Error::PlayerNotReady));
        assert!(controller.state().is_idle());
        assert_eq!(controller.state().current_index, None);
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let (mut controller, player) = controller_with(&["a", "b", "c"]);
        controller.select_track(2).unwrap();
        player.clear();

        controller.next().unwrap();

        assert_eq!(controller.state().current_index, Some(0));
        assert_eq!(player.commands()[0], Command::Load("a".to_string()));
    }

    #[test]
    fn previous_wraps_from_first_to_last() {
        let (mut controller, player) = controller_with(&["a", "b", "c"]);
        controller.select_track(0).unwrap();
        player.clear();

        controller.previous().unwrap();

        assert_eq!(controller.state().current_index, Some(2));
        assert_eq!(player.commands()[0], Command::Load("c".to_string()));
    }

    #[test]
    fn previous_undoes_next_for_every_position() {
        for len in 1..=5usize {
            let ids: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let (mut controller, _player) = controller_with(&id_refs);

            for start in 0..len {
                controller.select_track(start).unwrap();
                controller.next().unwrap();
                controller.previous().unwrap();
                assert_eq!(controller.state().current_index, Some(start));
            }
        }
    }

    #[test]
    fn next_on_empty_queue_is_a_no_op() {
        let (mut controller, player) = controller_with(&[]);

        assert_eq!(controller.next(), Err(Error::NotReady));
        assert_eq!(controller.previous(), Err(Error::NotReady));

        assert!(player.commands().is_empty());
        assert!(controller.state().is_idle());
    }

    #[test]
    fn next_without_selection_is_a_no_op() {
        let (mut controller, player) = controller_with(&["a", "b"]);

        assert_eq!(controller.next(), Err(Error::NotReady));
        assert!(player.commands().is_empty());
        assert_eq!(controller.state().current_index, None);
    }

    #[test]
    fn set_queue_resets_selection_without_player_calls() {
        let (mut controller, player) = controller_with(&["a", "b"]);
        controller.select_track(1).unwrap();
        controller.on_external_state_change(PlayerState::Playing);
        player.clear();

        controller.set_queue(tracks(&["x", "y", "z"]));

        assert_eq!(controller.state().current_index, None);
        assert!(!controller.state().is_playing);
        assert!(controller.state().is_idle());
        assert!(player.commands().is_empty());
    }

    #[test]
    fn toggle_flips_immediately_and_waits_for_confirmation() {
        let (mut controller, player) = controller_with(&["a"]);
        controller.select_track(0).unwrap();
        controller.on_external_state_change(PlayerState::Playing);
        player.clear();

        controller.toggle_play_pause().unwrap();

        assert_eq!(player.commands(), vec![Command::Pause]);
        assert!(!controller.state().is_playing);
        assert_eq!(controller.state().pending_intent, Some(TransportIntent::Pause));

        controller.on_external_state_change(PlayerState::Paused);
        assert_eq!(controller.state().pending_intent, None);
        assert_eq!(controller.state().transport, TransportState::Paused);

        controller.toggle_play_pause().unwrap();
        assert_eq!(player.commands(), vec![Command::Pause, Command::Play]);
        assert!(controller.state().is_playing);
    }

    #[test]
    fn toggle_without_a_track_is_rejected() {
        let (mut controller, player) = controller_with(&["a"]);

        assert_eq!(controller.toggle_play_pause(), Err(Error::NotReady));
        assert!(player.commands().is_empty());
    }

    #[test]
    fn seek_past_duration_is_rejected() {
        let (mut controller, player) = controller_with(&["a"]);
        controller.select_track(0).unwrap();
        player.set_position(12.0, 200.0);
        controller.poll_progress().unwrap();
        player.clear();

        let err = controller.seek(201.0).unwrap_err();

        assert!(matches!(err, Error::InvalidSeek { .. }));
        assert_eq!(controller.state().progress_seconds, 12.0);
        assert!(player.commands().is_empty());
    }

    #[test]
    fn seek_updates_progress_optimistically() {
        let (mut controller, player) = controller_with(&["a"]);
        controller.select_track(0).unwrap();
        player.set_position(0.0, 200.0);
        controller.poll_progress().unwrap();
        player.clear();

        controller.seek(95.5).unwrap();

        assert_eq!(player.commands(), vec![Command::SeekTo(95.5)]);
        assert_eq!(controller.state().progress_seconds, 95.5);
    }

    #[test]
    fn poll_reads_position_and_duration() {
        let (mut controller, player) = controller_with(&["a"]);
        controller.select_track(0).unwrap();
        player.set_position(33.0, 180.0);

        controller.poll_progress().unwrap();

        assert_eq!(controller.state().progress_seconds, 33.0);
        assert_eq!(controller.state().duration_seconds, 180.0);
    }

    #[test]
    fn poll_while_idle_leaves_state_alone() {
        let (mut controller, player) = controller_with(&["a"]);
        player.set_position(33.0, 180.0);

        controller.poll_progress().unwrap();

        assert_eq!(controller.state().progress_seconds, 0.0);
        assert_eq!(controller.state().duration_seconds, 0.0);
    }
}
