//! Queue list controller
//!
//! Owns the browsable list of items (recent episodes, or items in progress
//! when the server has no podcast library). Mutations are optimistic: the
//! local list changes immediately and the server call runs in the
//! background. A failed confirmation is only logged; the next `load` is
//! what brings the list back in line with the server.

use crate::{
    controller::PlaybackController,
    error::{PlaybackError, Result},
    types::PlaybackConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use textcast_core::{
    find_episodic, CompositeId, MediaError, MediaServer, ProgressIndex, ProgressPatch, QueueItem,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct ListState {
    items: Vec<QueueItem>,
    selected: Option<QueueItem>,
    error_message: Option<String>,
}

/// Server call that confirms an optimistic change
#[derive(Debug, Clone, Copy)]
enum Confirmation {
    Delete,
    MarkFinished,
    Restart,
}

impl Confirmation {
    fn action(self) -> &'static str {
        match self {
            Self::Delete => "delete item",
            Self::MarkFinished => "mark item as finished",
            Self::Restart => "restart progress",
        }
    }
}

/// Clears the loading flag however `load` exits
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Listing and optimistic mutations for the browsable queue
///
/// All methods take `&self`, so the controller can be shared between the
/// UI and background tasks.
pub struct QueueListController {
    server: Arc<dyn MediaServer>,
    config: PlaybackConfig,
    state: Mutex<ListState>,
    loading: AtomicBool,
    cancel: Mutex<CancellationToken>,
}

impl QueueListController {
    pub fn new(server: Arc<dyn MediaServer>, config: PlaybackConfig) -> Self {
        Self {
            server,
            config,
            state: Mutex::new(ListState::default()),
            loading: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    // ===== Listing =====

    /// Fetch the listing and replace the local items
    ///
    /// A call made while another load is in flight returns immediately.
    /// Failures end up in [`error_message`](Self::error_message);
    /// cancellation is swallowed and leaves the list untouched.
    pub async fn load(&self, progress: &ProgressIndex) {
        if self.loading.swap(true, Ordering::AcqRel) {
            debug!("Already loading, skipping duplicate request");
            return;
        }
        let _guard = LoadingGuard(&self.loading);

        let token = self.fresh_token();
        self.lock_state().error_message = None;

        let result = tokio::select! {
            biased;
            () = token.cancelled() => Err(MediaError::Cancelled),
            result = self.fetch(progress) => result,
        };

        match result {
            Ok(items) if !token.is_cancelled() => {
                info!(count = items.len(), "Loaded queue list");
                if let Some(first) = items.first() {
                    debug!(item_id = %first.id, title = %first.title, progress = first.progress, "First item");
                }
                self.lock_state().items = items;
            }
            Ok(_) => info!("Load cancelled"),
            Err(e) if e.is_cancelled() => info!("Load cancelled"),
            Err(e) => {
                error!(error = %e, "Failed to load queue list");
                self.lock_state().error_message = Some(user_message(&e));
            }
        }
    }

    /// Refresh the progress index, then load
    ///
    /// A failed index refresh is logged and the previous index is used.
    pub async fn refresh(&self, progress: &mut ProgressIndex) {
        if let Err(e) = progress.refresh(self.server.as_ref()).await {
            warn!(error = %e, "Failed to refresh progress, using previous index");
        }
        self.load(progress).await;
    }

    /// Abandon the in-flight load, if any
    pub fn cancel_load(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    async fn fetch(&self, progress: &ProgressIndex) -> textcast_core::Result<Vec<QueueItem>> {
        let libraries = self.server.list_libraries().await?;
        let limit = self.config.list_limit;

        match find_episodic(&libraries, &self.config.episodic_media_type) {
            Some(library) => {
                debug!(library_id = %library.id, "Listing recent episodes");
                let episodes = self
                    .server
                    .list_episodic_content(&library.id, limit)
                    .await?;
                Ok(episodes.iter().map(|item| progress.apply(item)).collect())
            }
            None => {
                debug!("No episodic library, listing items in progress");
                self.server.list_in_progress(limit).await
            }
        }
    }

    fn fresh_token(&self) -> CancellationToken {
        let mut slot = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = CancellationToken::new();
        slot.clone()
    }

    // ===== Optimistic Mutations =====

    /// Delete an item permanently
    ///
    /// The item leaves the list and the play queue right away; if it was
    /// playing, the player moves on to its successor or stops. Returns the
    /// background confirmation task, or `None` when the id cannot address
    /// an episode.
    pub async fn delete(
        &self,
        id: &str,
        player: &mut PlaybackController,
    ) -> Result<Option<JoinHandle<()>>> {
        let item = self.take_item(id)?;
        let confirmation = self.confirm(&item, Confirmation::Delete);
        player.remove_item(id).await?;
        Ok(confirmation)
    }

    /// Mark an item as finished; it leaves the list
    pub fn mark_finished(&self, id: &str) -> Result<Option<JoinHandle<()>>> {
        let item = self.take_item(id)?;
        Ok(self.confirm(&item, Confirmation::MarkFinished))
    }

    /// Reset an item's progress to zero in place
    pub fn restart(&self, id: &str) -> Result<Option<JoinHandle<()>>> {
        let item = {
            let mut state = self.lock_state();
            let slot = state
                .items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| PlaybackError::ItemNotFound(id.to_string()))?;
            *slot = slot.restarted();
            slot.clone()
        };
        Ok(self.confirm(&item, Confirmation::Restart))
    }

    fn take_item(&self, id: &str) -> Result<QueueItem> {
        let mut state = self.lock_state();
        let index = state
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| PlaybackError::ItemNotFound(id.to_string()))?;
        if state.selected.as_ref().is_some_and(|selected| selected.id == id) {
            state.selected = None;
        }
        Ok(state.items.remove(index))
    }

    fn confirm(&self, item: &QueueItem, confirmation: Confirmation) -> Option<JoinHandle<()>> {
        let id = match CompositeId::parse_child(&item.id) {
            Ok(id) => id,
            Err(e) => {
                error!(item_id = %item.id, error = %e, "Invalid item ID format");
                return None;
            }
        };

        let server = Arc::clone(&self.server);
        let title = item.title.clone();
        let duration = item.total_duration;

        Some(tokio::spawn(async move {
            let result = match confirmation {
                Confirmation::Delete => match id.child() {
                    Some(child) => server.delete_episode(id.container(), child).await,
                    None => Err(MediaError::MalformedIdentifier(id.to_string())),
                },
                Confirmation::MarkFinished => {
                    server
                        .patch_progress(&id, ProgressPatch::finished(duration))
                        .await
                }
                Confirmation::Restart => {
                    server
                        .patch_progress(&id, ProgressPatch::restart(duration))
                        .await
                }
            };

            match result {
                Ok(()) => info!(item_id = %id, title = %title, "Confirmed: {}", confirmation.action()),
                Err(e) => error!(item_id = %id, error = %e, "Failed to {}", confirmation.action()),
            }
        }))
    }

    // ===== Selection & Playback =====

    /// Remember an item as selected; `false` if it is not listed
    pub fn select(&self, id: &str) -> bool {
        let mut state = self.lock_state();
        let found = state.items.iter().find(|item| item.id == id).cloned();
        let listed = found.is_some();
        if listed {
            state.selected = found;
        }
        listed
    }

    pub fn selected(&self) -> Option<QueueItem> {
        self.lock_state().selected.clone()
    }

    /// Play an item followed by everything listed after it
    pub async fn play_from(&self, id: &str, player: &mut PlaybackController) -> Result<()> {
        let tail = {
            let mut state = self.lock_state();
            let index = state
                .items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| PlaybackError::ItemNotFound(id.to_string()))?;
            let tail = state.items[index..].to_vec();
            state.selected = tail.first().cloned();
            tail
        };
        info!(item_id = %id, queued = tail.len(), "Playing from list");
        player.play_from(tail, 0).await
    }

    // ===== State Queries =====

    pub fn items(&self) -> Vec<QueueItem> {
        self.lock_state().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// User-facing message for the last failed load
    pub fn error_message(&self) -> Option<String> {
        self.lock_state().error_message.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn user_message(err: &MediaError) -> String {
    if err.is_unauthorized() {
        "Not authenticated".to_string()
    } else {
        format!("Failed to load latest: {}", err)
    }
}
