//! Playback controller - core orchestration
//!
//! Coordinates the play queue, the transport adapter and the session
//! tracker. The controller is the single owner of that state: every
//! mutation goes through `&mut self`, either called directly by the host or
//! from [`PlaybackController::run`], which serializes user intents and
//! transport events on one task.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    queue::{PlaybackQueue, Removal},
    session::{PendingSync, SessionTracker},
    transport::{AdapterSignal, MediaTransport, TransportAdapter, TransportEvent},
    types::{PlaybackConfig, PlaybackIntent, PlaybackState},
};
use std::sync::Arc;
use textcast_core::{MediaError, MediaServer, QueueItem};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

type SyncTask = JoinHandle<(PendingSync, textcast_core::Result<()>)>;

/// Playback queue controller
///
/// State machine: `Empty -> Loading -> Ready -> Ended`, with `Loading`
/// re-entered for every item the queue moves to.
pub struct PlaybackController {
    server: Arc<dyn MediaServer>,
    transport: TransportAdapter,
    session: SessionTracker,
    queue: PlaybackQueue,
    state: PlaybackState,
    config: PlaybackConfig,

    // Resume position applied once the transport is ready
    pending_seek: Option<f64>,

    // Whether playback starts once the transport is ready
    auto_play: bool,

    // Periodic sync running in the background
    in_flight_sync: Option<SyncTask>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create new playback controller
    pub fn new(
        server: Arc<dyn MediaServer>,
        transport: Box<dyn MediaTransport>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            server,
            transport: TransportAdapter::new(transport),
            session: SessionTracker::new(config.sync_interval()),
            queue: PlaybackQueue::new(),
            state: PlaybackState::Empty,
            config,
            pending_seek: None,
            auto_play: true,
            in_flight_sync: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Queue Control =====

    /// Replace the queue with a single item and start it
    pub async fn play_single(&mut self, item: QueueItem) -> Result<()> {
        self.play_from(vec![item], 0).await
    }

    /// Replace the queue and start at `start_index`
    pub async fn play_from(&mut self, items: Vec<QueueItem>, start_index: usize) -> Result<()> {
        if items.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        let queue = PlaybackQueue::from_items(items, start_index)
            .ok_or(PlaybackError::IndexOutOfBounds(start_index))?;

        let previous_id = self.current_id();
        self.queue = queue;
        self.emit_queue_changed();
        self.load_current(previous_id).await
    }

    /// Move to the next item
    ///
    /// Returns `Ok(false)` without touching anything at the end of the queue.
    pub async fn advance_next(&mut self) -> Result<bool> {
        self.ensure_current()?;
        let previous_id = self.current_id();
        if !self.queue.advance() {
            info!("End of queue reached");
            return Ok(false);
        }
        self.emit_queue_changed();
        self.load_current(previous_id).await?;
        Ok(true)
    }

    /// Move to the previous item; `Ok(false)` at the first one
    pub async fn advance_previous(&mut self) -> Result<bool> {
        self.ensure_current()?;
        let previous_id = self.current_id();
        if !self.queue.retreat() {
            return Ok(false);
        }
        self.emit_queue_changed();
        self.load_current(previous_id).await?;
        Ok(true)
    }

    /// Remove an item from the queue, repairing the cursor
    ///
    /// Removing the current item loads its successor, or stops playback
    /// when there is none. Returns whether the item was queued.
    pub async fn remove_item(&mut self, id: &str) -> Result<bool> {
        match self.queue.remove(id) {
            Removal::NotFound => Ok(false),
            Removal::BeforeCursor | Removal::AfterCursor | Removal::Detached => {
                debug!(item_id = %id, "Removed item from queue");
                self.emit_queue_changed();
                Ok(true)
            }
            Removal::Current {
                has_successor: true,
            } => {
                info!(item_id = %id, "Removed current item, loading successor");
                self.emit_queue_changed();
                self.load_current(Some(id.to_string())).await?;
                Ok(true)
            }
            Removal::Current {
                has_successor: false,
            } => {
                info!(item_id = %id, "Removed current item, nothing left to play");
                self.emit_queue_changed();
                self.stop();
                Ok(true)
            }
        }
    }

    // ===== Playback Control =====

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Empty => Err(PlaybackError::NoItemLoaded),
            PlaybackState::Loading => {
                self.auto_play = true;
                Ok(())
            }
            PlaybackState::Ready => {
                if !self.transport.is_playing() {
                    self.transport.play();
                    self.session.mark_playing(Instant::now());
                    self.emit_position();
                }
                Ok(())
            }
            PlaybackState::Ended => {
                self.transport.seek(0.0);
                self.transport.play();
                self.session.mark_playing(Instant::now());
                self.set_state(PlaybackState::Ready);
                self.emit_position();
                Ok(())
            }
        }
    }

    /// Pause playback and report progress before returning
    ///
    /// The sync is best-effort: a failure is logged, not returned.
    pub async fn pause(&mut self) -> Result<()> {
        if self.state == PlaybackState::Empty {
            return Err(PlaybackError::NoItemLoaded);
        }
        if self.state == PlaybackState::Loading {
            self.auto_play = false;
        }
        if self.transport.is_playing() {
            self.transport.pause();
            self.session.mark_paused(Instant::now());
            self.emit_position();
        }
        self.sync_now().await;
        Ok(())
    }

    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        let playing = match self.state {
            PlaybackState::Loading => self.auto_play,
            _ => self.transport.is_playing(),
        };
        if playing {
            self.pause().await
        } else {
            self.play()
        }
    }

    /// Stop playback
    ///
    /// Clears the current item but keeps the play queue. The session is
    /// dropped without a final sync.
    pub fn stop(&mut self) {
        self.transport.unload();
        self.session.reset();
        self.pending_seek = None;
        self.in_flight_sync = None;
        if self.queue.cursor().is_some() {
            self.queue.release();
            self.emit_queue_changed();
        }
        self.set_state(PlaybackState::Empty);
    }

    // ===== Seek =====

    /// Seek to an absolute position in seconds
    ///
    /// While loading, the position replaces the pending resume position.
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        match self.state {
            PlaybackState::Empty => Err(PlaybackError::NoItemLoaded),
            PlaybackState::Loading => {
                self.pending_seek = Some(seconds.max(0.0));
                Ok(())
            }
            PlaybackState::Ready | PlaybackState::Ended => {
                self.transport.seek(seconds);
                self.emit_position();
                Ok(())
            }
        }
    }

    pub fn skip_forward(&mut self) -> Result<()> {
        let delta = self.config.skip_interval_secs;
        self.skip(delta)
    }

    pub fn skip_backward(&mut self) -> Result<()> {
        let delta = self.config.skip_interval_secs;
        self.skip(-delta)
    }

    fn skip(&mut self, delta: f64) -> Result<()> {
        match self.state {
            PlaybackState::Empty => Err(PlaybackError::NoItemLoaded),
            PlaybackState::Loading => Ok(()),
            PlaybackState::Ready | PlaybackState::Ended => {
                if delta >= 0.0 {
                    self.transport.skip_forward(delta);
                } else {
                    self.transport.skip_backward(-delta);
                }
                self.emit_position();
                Ok(())
            }
        }
    }

    // ===== Transport Events =====

    /// Apply a notification from the platform player
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        for signal in self.transport.observe(event) {
            match signal {
                AdapterSignal::Ready { duration } => self.on_ready(duration),
                // The adapter may have seeked or started since the tick
                AdapterSignal::Position { .. } => self.on_position().await,
                AdapterSignal::Ended => self.on_ended().await,
                AdapterSignal::Failed { message } => {
                    error!(message = %message, "Transport failed");
                    self.session.mark_paused(Instant::now());
                    self.emit_warning(format!("Playback failed: {}", message));
                }
            }
        }
    }

    fn on_ready(&mut self, duration: f64) {
        if self.state != PlaybackState::Loading {
            return;
        }
        debug!(duration, "Transport ready");

        if let Some(position) = self.pending_seek.take() {
            self.transport.seek(position);
        }
        if self.auto_play {
            self.transport.play();
            self.session.mark_playing(Instant::now());
        } else if self.transport.is_playing() {
            self.transport.pause();
        }
        self.set_state(PlaybackState::Ready);
        self.emit_position();
    }

    async fn on_position(&mut self) {
        let now = Instant::now();
        let current_time = self.transport.current_time();
        let duration = self.transport.duration();
        let is_playing = self.transport.is_playing();

        if self.state == PlaybackState::Ready {
            self.queue.set_current_time(current_time);
            if is_playing {
                self.session.mark_playing(now);
            } else {
                self.session.mark_paused(now);
            }
        }
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            current_time,
            duration,
            is_playing,
        });

        self.reap_sync().await;
        if self.state == PlaybackState::Ready
            && is_playing
            && self.in_flight_sync.is_none()
            && self.session.is_sync_due(now)
        {
            self.spawn_sync(now);
        }
    }

    async fn on_ended(&mut self) {
        if !matches!(self.state, PlaybackState::Ready | PlaybackState::Loading) {
            return;
        }
        self.session.mark_paused(Instant::now());
        // Finished items start over when revisited
        self.queue.set_current_time(0.0);
        self.set_state(PlaybackState::Ended);

        match self.advance_next().await {
            Ok(true) => {}
            Ok(false) => self.pending_events.push(PlaybackEvent::EndOfQueue),
            Err(e) => warn!(error = %e, "Could not advance after end of media"),
        }
    }

    // ===== Item Loading =====

    /// Start a session for the current item and hand its stream to the
    /// transport
    ///
    /// A failed session start leaves the controller in `Loading` with the
    /// transport idle. Only `Unauthorized` is returned to the caller.
    async fn load_current(&mut self, previous_id: Option<String>) -> Result<()> {
        let Some(item) = self.queue.current().cloned() else {
            self.stop();
            return Ok(());
        };

        self.transport.unload();
        self.session.reset();
        self.in_flight_sync = None;
        self.pending_seek = None;
        self.auto_play = true;
        self.set_state(PlaybackState::Loading);
        self.pending_events.push(PlaybackEvent::ItemChanged {
            id: item.id.clone(),
            previous_id,
        });

        info!(item_id = %item.id, title = %item.title, "Loading item");
        let info = match self
            .server
            .start_playback_session(&item.composite_id())
            .await
        {
            Ok(info) => info,
            Err(e) => {
                error!(item_id = %item.id, error = %e, "Failed to start playback session");
                self.emit_warning(format!("Cannot play '{}': {}", item.title, e));
                return match e {
                    MediaError::Unauthorized => Err(e.into()),
                    _ => Ok(()),
                };
            }
        };

        self.transport.load(&info.stream_url);
        self.session.start(info.session_id, Instant::now());
        if item.current_time > 0.0 {
            self.pending_seek = Some(item.current_time);
        }
        self.pending_events.push(PlaybackEvent::NowPlaying {
            title: item.title,
            author: item.author,
        });
        Ok(())
    }

    // ===== Progress Sync =====

    /// Report progress now, waiting for any background sync first
    ///
    /// Skipped without an active session or a known duration.
    pub async fn sync_now(&mut self) {
        self.await_sync().await;

        let Some(pending) = self.session.begin_sync(
            Instant::now(),
            self.transport.current_time(),
            self.transport.duration(),
        ) else {
            debug!("Skipping progress sync");
            return;
        };
        let result = self
            .server
            .sync_progress(&pending.session_id, pending.report)
            .await;
        self.finish_sync(&pending, result);
    }

    fn spawn_sync(&mut self, now: Instant) {
        let Some(pending) = self.session.begin_sync(
            now,
            self.transport.current_time(),
            self.transport.duration(),
        ) else {
            return;
        };
        debug!(session_id = %pending.session_id, "Syncing progress in background");

        let server = Arc::clone(&self.server);
        self.in_flight_sync = Some(tokio::spawn(async move {
            let result = server
                .sync_progress(&pending.session_id, pending.report)
                .await;
            (pending, result)
        }));
    }

    async fn reap_sync(&mut self) {
        if self
            .in_flight_sync
            .as_ref()
            .is_some_and(JoinHandle::is_finished)
        {
            self.await_sync().await;
        }
    }

    async fn await_sync(&mut self) {
        let Some(task) = self.in_flight_sync.take() else {
            return;
        };
        match task.await {
            Ok((pending, result)) => self.finish_sync(&pending, result),
            Err(e) => error!(error = %e, "Progress sync task failed"),
        }
    }

    fn finish_sync(&mut self, pending: &PendingSync, result: textcast_core::Result<()>) {
        match result {
            Ok(()) => {
                if self.session.complete_sync(pending, Instant::now()) {
                    debug!(
                        session_id = %pending.session_id,
                        current_time = pending.report.current_time,
                        time_listened = pending.report.time_listened,
                        "Progress synced"
                    );
                    self.pending_events.push(PlaybackEvent::ProgressSynced {
                        session_id: pending.session_id.clone(),
                        current_time: pending.report.current_time,
                        time_listened: pending.report.time_listened,
                    });
                }
            }
            Err(e) => {
                error!(session_id = %pending.session_id, error = %e, "Failed to sync progress");
                self.session.fail_sync(pending);
            }
        }
    }

    // ===== Intents =====

    /// Dispatch a user action or remote media-key command
    pub async fn handle_intent(&mut self, intent: PlaybackIntent) -> Result<()> {
        match intent {
            PlaybackIntent::Play => self.play(),
            PlaybackIntent::Pause => self.pause().await,
            PlaybackIntent::TogglePlayPause => self.toggle_play_pause().await,
            PlaybackIntent::Next => self.advance_next().await.map(|_| ()),
            PlaybackIntent::Previous => self.advance_previous().await.map(|_| ()),
            PlaybackIntent::SkipForward => self.skip_forward(),
            PlaybackIntent::SkipBackward => self.skip_backward(),
            PlaybackIntent::Seek(seconds) => self.seek(seconds),
            PlaybackIntent::Stop => {
                self.stop();
                Ok(())
            }
        }
    }

    /// Drive the controller from channels until both are closed
    ///
    /// Events are forwarded to `observer` after every intent or transport
    /// event. Returns the controller so the host can inspect its final state.
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<PlaybackIntent>,
        mut transport_events: mpsc::Receiver<TransportEvent>,
        observer: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> Self {
        let mut intents_open = true;
        let mut transport_open = true;

        while intents_open || transport_open {
            tokio::select! {
                intent = intents.recv(), if intents_open => match intent {
                    Some(intent) => {
                        if let Err(e) = self.handle_intent(intent).await {
                            warn!(?intent, error = %e, "Intent rejected");
                        }
                    }
                    None => intents_open = false,
                },
                event = transport_events.recv(), if transport_open => match event {
                    Some(event) => self.handle_transport_event(event).await,
                    None => transport_open = false,
                },
            }

            for event in self.drain_events() {
                // The observer going away does not stop playback
                let _ = observer.send(event);
            }
        }

        debug!("Playback controller loop finished");
        self
    }

    // ===== State Queries =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_item(&self) -> Option<&QueueItem> {
        self.queue.current()
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Last known position in seconds
    pub fn current_time(&self) -> f64 {
        self.transport.current_time()
    }

    /// Duration in seconds, 0 while unknown
    pub fn duration(&self) -> f64 {
        self.transport.duration()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    fn ensure_current(&self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        if self.queue.cursor().is_none() {
            return Err(PlaybackError::NoItemLoaded);
        }
        Ok(())
    }

    fn current_id(&self) -> Option<String> {
        self.queue.current().map(|item| item.id.clone())
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Playback state changed");
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            cursor: self.queue.cursor(),
        });
    }

    fn emit_position(&mut self) {
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            current_time: self.transport.current_time(),
            duration: self.transport.duration(),
            is_playing: self.transport.is_playing(),
        });
    }

    fn emit_warning(&mut self, message: String) {
        self.pending_events.push(PlaybackEvent::Warning { message });
    }
}
