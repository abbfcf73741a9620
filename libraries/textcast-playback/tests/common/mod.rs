//! Shared fakes for playback integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use textcast_core::{
    CompositeId, Library, MediaError, MediaServer, PlaybackSessionInfo, ProgressEntry,
    ProgressPatch, QueueItem, SyncReport,
};
use textcast_playback::{MediaTransport, PlaybackConfig, PlaybackController};

// ===== Fake Media Server =====

#[derive(Debug, Clone, PartialEq)]
pub enum ServerCall {
    StartSession(String),
    Sync {
        session_id: String,
        report: SyncReport,
    },
    ListLibraries,
    ListEpisodic(String),
    ListInProgress,
    FetchProgress,
    DeleteEpisode(String, String),
    PatchProgress(String, ProgressPatch),
}

/// In-memory media server that records every call
#[derive(Default)]
pub struct FakeServer {
    calls: Mutex<Vec<ServerCall>>,
    libraries: Mutex<Vec<Library>>,
    episodes: Mutex<Vec<QueueItem>>,
    in_progress: Mutex<Vec<QueueItem>>,
    progress: Mutex<Vec<ProgressEntry>>,
    session_failures: Mutex<HashMap<String, MediaError>>,
    listing_failure: Mutex<Option<MediaError>>,
    listing_delay: Mutex<Option<Duration>>,
    sync_failing: AtomicBool,
    mutations_failing: AtomicBool,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Server with one podcast library holding `episodes`
    pub fn with_podcast(episodes: Vec<QueueItem>) -> Arc<Self> {
        let server = Self::default();
        *server.libraries.lock().expect("lock") = vec![
            Library {
                id: "lib-books".into(),
                name: "Books".into(),
                media_type: "book".into(),
            },
            Library {
                id: "lib-pod".into(),
                name: "Podcasts".into(),
                media_type: "podcast".into(),
            },
        ];
        *server.episodes.lock().expect("lock") = episodes;
        Arc::new(server)
    }

    /// Server without a podcast library
    pub fn with_in_progress(items: Vec<QueueItem>) -> Arc<Self> {
        let server = Self::default();
        *server.libraries.lock().expect("lock") = vec![Library {
            id: "lib-books".into(),
            name: "Books".into(),
            media_type: "book".into(),
        }];
        *server.in_progress.lock().expect("lock") = items;
        Arc::new(server)
    }

    pub fn set_progress(&self, entries: Vec<ProgressEntry>) {
        *self.progress.lock().expect("lock") = entries;
    }

    pub fn set_episodes(&self, episodes: Vec<QueueItem>) {
        *self.episodes.lock().expect("lock") = episodes;
    }

    pub fn fail_session(&self, id: &str, error: MediaError) {
        self.session_failures
            .lock()
            .expect("lock")
            .insert(id.to_string(), error);
    }

    pub fn fail_listing(&self, error: MediaError) {
        *self.listing_failure.lock().expect("lock") = Some(error);
    }

    pub fn restore_listing(&self) {
        *self.listing_failure.lock().expect("lock") = None;
    }

    pub fn set_mutations_failing(&self, failing: bool) {
        self.mutations_failing.store(failing, Ordering::SeqCst);
    }

    pub fn delay_listing(&self, delay: Duration) {
        *self.listing_delay.lock().expect("lock") = Some(delay);
    }

    pub fn set_sync_failing(&self, failing: bool) {
        self.sync_failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ServerCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn count(&self, predicate: impl Fn(&ServerCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn sync_reports(&self) -> Vec<SyncReport> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServerCall::Sync { report, .. } => Some(report),
                _ => None,
            })
            .collect()
    }

    pub fn session_starts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ServerCall::StartSession(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ServerCall) {
        self.calls.lock().expect("lock").push(call);
    }

    fn mutation_result(&self) -> textcast_core::Result<()> {
        if self.mutations_failing.load(Ordering::SeqCst) {
            return Err(MediaError::server(500, "mutation rejected"));
        }
        Ok(())
    }

    async fn listing_gate(&self) -> textcast_core::Result<()> {
        let delay = *self.listing_delay.lock().expect("lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.listing_failure.lock().expect("lock").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MediaServer for FakeServer {
    async fn start_playback_session(
        &self,
        id: &CompositeId,
    ) -> textcast_core::Result<PlaybackSessionInfo> {
        let key = id.to_string();
        self.record(ServerCall::StartSession(key.clone()));
        if let Some(error) = self.session_failures.lock().expect("lock").get(&key) {
            return Err(error.clone());
        }
        Ok(PlaybackSessionInfo {
            session_id: session_id(&key),
            stream_url: stream_url(&key),
        })
    }

    async fn sync_progress(&self, session_id: &str, report: SyncReport) -> textcast_core::Result<()> {
        self.record(ServerCall::Sync {
            session_id: session_id.to_string(),
            report,
        });
        if self.sync_failing.load(Ordering::SeqCst) {
            return Err(MediaError::network("connection reset"));
        }
        Ok(())
    }

    async fn list_libraries(&self) -> textcast_core::Result<Vec<Library>> {
        self.record(ServerCall::ListLibraries);
        self.listing_gate().await?;
        Ok(self.libraries.lock().expect("lock").clone())
    }

    async fn list_episodic_content(
        &self,
        library_id: &str,
        limit: usize,
    ) -> textcast_core::Result<Vec<QueueItem>> {
        self.record(ServerCall::ListEpisodic(library_id.to_string()));
        let episodes = self.episodes.lock().expect("lock");
        Ok(episodes.iter().take(limit).cloned().collect())
    }

    async fn list_in_progress(&self, limit: usize) -> textcast_core::Result<Vec<QueueItem>> {
        self.record(ServerCall::ListInProgress);
        let items = self.in_progress.lock().expect("lock");
        Ok(items.iter().take(limit).cloned().collect())
    }

    async fn fetch_current_user_progress(&self) -> textcast_core::Result<Vec<ProgressEntry>> {
        self.record(ServerCall::FetchProgress);
        Ok(self.progress.lock().expect("lock").clone())
    }

    async fn delete_episode(&self, container_id: &str, child_id: &str) -> textcast_core::Result<()> {
        self.record(ServerCall::DeleteEpisode(
            container_id.to_string(),
            child_id.to_string(),
        ));
        self.mutation_result()
    }

    async fn patch_progress(
        &self,
        id: &CompositeId,
        patch: ProgressPatch,
    ) -> textcast_core::Result<()> {
        self.record(ServerCall::PatchProgress(id.to_string(), patch));
        self.mutation_result()
    }
}

pub fn session_id(item_id: &str) -> String {
    format!("session-{}", item_id)
}

pub fn stream_url(item_id: &str) -> String {
    format!("http://media.test/{}", item_id)
}

// ===== Fake Transport =====

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Load(String),
    Play,
    Pause,
    Seek(f64),
}

/// Transport that only records commands; tests feed events by hand
#[derive(Clone, Default)]
pub struct FakeTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("lock").clear();
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl MediaTransport for FakeTransport {
    fn load(&mut self, url: &str) {
        self.record(TransportCall::Load(url.to_string()));
    }

    fn play(&mut self) {
        self.record(TransportCall::Play);
    }

    fn pause(&mut self) {
        self.record(TransportCall::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.record(TransportCall::Seek(seconds));
    }
}

// ===== Builders =====

pub fn new_player(server: &Arc<FakeServer>) -> (PlaybackController, FakeTransport) {
    let transport = FakeTransport::default();
    let player = PlaybackController::new(
        server.clone(),
        Box::new(transport.clone()),
        PlaybackConfig::default(),
    );
    (player, transport)
}

/// Episode with a composite id `pod/{name}`
pub fn episode(name: &str, duration: f64, current_time: f64) -> QueueItem {
    let progress = if duration > 0.0 {
        current_time / duration
    } else {
        0.0
    };
    QueueItem::new(format!("pod/{}", name), format!("Episode {}", name), duration)
        .with_author("Test Podcast")
        .with_progress(current_time, progress)
}

pub fn ids(items: &[QueueItem]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

/// Let spawned tasks run to completion
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
