//! Scoped ownership of a queue controller for one mounted view
//!
//! A [`PlaybackSession`] is created when a view mounts and torn down when it
//! unmounts. It owns the controller, the player notification listener and the
//! progress poller; tearing it down stops both tasks and releases the player.
//! Hosts keep a [`SessionHandle`] for work that completes later (search
//! results, store calls) so late results are dropped once the view is gone.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::model::{PlaybackState, Track};
use crate::player::PlayerConnection;

use super::player_events::{spawn_event_listener, spawn_progress_poller};
use super::PlaybackQueueController;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What a view renders: the playback state and the track it refers to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub track: Option<Track>,
}

impl SessionSnapshot {
    pub(crate) fn of(controller: &PlaybackQueueController) -> Self {
        Self {
            state: controller.state().clone(),
            track: controller.current_track().cloned(),
        }
    }

    /// How many tracks were started between `earlier` and this snapshot.
    ///
    /// Snapshots are coalesced on the way to subscribers, so a host that only
    /// looks at transport changes can miss a load; the load count cannot.
    pub fn tracks_started_since(&self, earlier: &SessionSnapshot) -> u64 {
        self.state.loads.saturating_sub(earlier.state.loads)
    }
}

pub struct PlaybackSession {
    controller: Arc<Mutex<PlaybackQueueController>>,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
    poll_interval: Duration,
    listener: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    /// Create the controller for a newly mounted view. No player yet.
    pub fn mount(poll_interval: Duration) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::default());
        tracing::debug!(?poll_interval, "Playback session mounted");
        Self {
            controller: Arc::new(Mutex::new(PlaybackQueueController::new())),
            snapshots: Arc::new(snapshots),
            poll_interval,
            listener: None,
            poller: None,
        }
    }

    /// Install a ready player and start listening to it.
    pub async fn attach_player(&mut self, connection: PlayerConnection) {
        self.stop_tasks();

        let PlayerConnection { handle, events } = connection;
        self.controller.lock().await.attach_player(handle);

        let weak = Arc::downgrade(&self.controller);
        self.listener = Some(spawn_event_listener(
            weak.clone(),
            events,
            self.snapshots.clone(),
        ));
        self.poller = Some(spawn_progress_poller(
            weak,
            self.poll_interval,
            self.snapshots.clone(),
        ));
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            controller: Arc::downgrade(&self.controller),
            snapshots: self.snapshots.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Tear down: stop the listener and poller and release the player.
    pub async fn unmount(mut self) {
        self.stop_tasks();
        self.controller.lock().await.detach_player();
        tracing::debug!("Playback session unmounted");
    }

    fn stop_tasks(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.stop_tasks();
        if let Ok(mut controller) = self.controller.try_lock() {
            controller.detach_player();
        }
    }
}

/// Weak reference to a mounted session's controller.
#[derive(Clone)]
pub struct SessionHandle {
    controller: Weak<Mutex<PlaybackQueueController>>,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionHandle {
    pub fn is_mounted(&self) -> bool {
        self.controller.strong_count() > 0
    }

    /// Run `f` against the controller if the session is still mounted.
    ///
    /// Returns `None` after teardown; the caller's result is discarded.
    pub async fn apply<R>(&self, f: impl FnOnce(&mut PlaybackQueueController) -> R) -> Option<R> {
        let Some(controller) = self.controller.upgrade() else {
            tracing::debug!("Session already unmounted, discarding late result");
            return None;
        };
        let mut guard = controller.lock().await;
        let result = f(&mut *guard);
        self.snapshots.send_replace(SessionSnapshot::of(&guard));
        Some(result)
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let controller = self.controller.upgrade()?;
        let guard = controller.lock().await;
        Some(SessionSnapshot::of(&guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlayerState, TransportState};
    use crate::player::testing::{Command, RecordingPlayer};
    use crate::player::{event_channel, SimulatedPlayer};

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track::new(*id, *id, "Channel", ""))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn notifications_flow_into_the_controller() {
        let mut session = PlaybackSession::mount(DEFAULT_POLL_INTERVAL);
        let player = RecordingPlayer::new();
        let (tx, rx) = event_channel();
        session
            .attach_player(PlayerConnection::new(player.clone(), rx))
            .await;
        let handle = session.handle();
        let mut updates = session.subscribe();

        handle
            .apply(|c| {
                c.set_queue(tracks(&["a", "b"]));
                c.select_track(1)
            })
            .await
            .unwrap()
            .unwrap();
        let _ = updates.borrow_and_update();

        tx.send(PlayerState::Ended).unwrap();
        updates.changed().await.unwrap();

        let snapshot = updates.borrow().clone();
        assert_eq!(snapshot.state.current_index, Some(0));
        assert_eq!(snapshot.track.unwrap().id, "a");
        assert!(player.commands().contains(&Command::Load("a".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn poller_publishes_progress() {
        let mut session = PlaybackSession::mount(Duration::from_secs(1));
        let player = RecordingPlayer::new();
        let (_tx, rx) = event_channel();
        session
            .attach_player(PlayerConnection::new(player.clone(), rx))
            .await;
        let handle = session.handle();

        handle
            .apply(|c| {
                c.set_queue(tracks(&["a"]));
                c.select_track(0)
            })
            .await
            .unwrap()
            .unwrap();
        player.set_position(41.0, 120.0);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state.progress_seconds, 41.0);
        assert_eq!(snapshot.state.duration_seconds, 120.0);
        assert_eq!(snapshot.state.transport, TransportState::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn every_track_start_is_visible_to_subscribers() {
        let mut session = PlaybackSession::mount(DEFAULT_POLL_INTERVAL);
        session.attach_player(SimulatedPlayer::connect(2.0)).await;
        let handle = session.handle();
        let mut updates = session.subscribe();
        let before = updates.borrow_and_update().clone();

        handle
            .apply(|c| {
                c.set_queue(tracks(&["a", "b", "c", "d"]));
                c.select_track(0)
            })
            .await
            .unwrap()
            .unwrap();

        // Tracks start at 0s, 2s, 4s and 6s
        tokio::time::sleep(Duration::from_secs(7)).await;

        let now = updates.borrow_and_update().clone();
        assert_eq!(now.tracks_started_since(&before), 4);
        assert_eq!(now.state.current_index, Some(3));
        assert_eq!(now.track.unwrap().id, "d");

        session.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn replaying_a_single_track_counts_each_start() {
        let mut session = PlaybackSession::mount(DEFAULT_POLL_INTERVAL);
        session.attach_player(SimulatedPlayer::connect(2.0)).await;
        let handle = session.handle();
        let updates = session.subscribe();
        let before = updates.borrow().clone();

        handle
            .apply(|c| {
                c.set_queue(tracks(&["only"]));
                c.select_track(0)
            })
            .await
            .unwrap()
            .unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;

        let now = updates.borrow().clone();
        assert_eq!(now.tracks_started_since(&before), 3);
        assert_eq!(now.state.current_index, Some(0));

        session.unmount().await;
    }

    #[tokio::test]
    async fn unmount_releases_everything() {
        let mut session = PlaybackSession::mount(DEFAULT_POLL_INTERVAL);
        let (tx, rx) = event_channel();
        session
            .attach_player(PlayerConnection::new(RecordingPlayer::new(), rx))
            .await;
        let handle = session.handle();
        assert!(handle.is_mounted());

        session.unmount().await;

        tokio::time::timeout(Duration::from_secs(1), tx.closed())
            .await
            .expect("listener should drop the event channel");
        assert!(!handle.is_mounted());
        assert!(handle.apply(|c| c.set_queue(Vec::new())).await.is_none());
        assert!(handle.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_session_stops_listening() {
        let mut session = PlaybackSession::mount(DEFAULT_POLL_INTERVAL);
        let (tx, rx) = event_channel();
        session
            .attach_player(PlayerConnection::new(RecordingPlayer::new(), rx))
            .await;
        let handle = session.handle();

        drop(session);

        tokio::time::timeout(Duration::from_secs(1), tx.closed())
            .await
            .expect("listener should drop the event channel");
        assert!(handle.apply(|_| ()).await.is_none());
    }

    #[tokio::test]
    async fn commands_before_attach_report_player_not_ready() {
        let session = PlaybackSession::mount(DEFAULT_POLL_INTERVAL);
        let handle = session.handle();
        assert_eq!(handle.apply(|c| c.is_player_ready()).await, Some(false));

        let result = handle
            .apply(|c| {
                c.set_queue(tracks(&["a"]));
                c.select_track(0)
            })
            .await
            .unwrap();

        assert_eq!(result, Err(crate::Error::PlayerNotReady));
    }
}
