/// Core traits for TextCast
use crate::error::Result;
use crate::types::{
    CompositeId, Library, PlaybackSessionInfo, ProgressEntry, ProgressPatch, QueueItem, SyncReport,
};
use async_trait::async_trait;

/// Remote media server contract
///
/// The playback and listing controllers only need these operations; the
/// HTTP implementation lives in `textcast-server-client`. Implementations
/// are shared as `Arc<dyn MediaServer>` and called from spawned tasks, so
/// they must be `Send + Sync`.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// Start a playback session for an item
    ///
    /// # Errors
    /// `Unauthorized` without a credential; any error means "cannot play".
    async fn start_playback_session(&self, id: &CompositeId) -> Result<PlaybackSessionInfo>;

    /// Report listening progress for an open session
    async fn sync_progress(&self, session_id: &str, report: SyncReport) -> Result<()>;

    /// All libraries visible to the current user
    async fn list_libraries(&self) -> Result<Vec<Library>>;

    /// Most recent episodes of an episodic library
    async fn list_episodic_content(&self, library_id: &str, limit: usize)
        -> Result<Vec<QueueItem>>;

    /// Items the current user has started
    async fn list_in_progress(&self, limit: usize) -> Result<Vec<QueueItem>>;

    /// Server-side progress for every item the user has touched
    async fn fetch_current_user_progress(&self) -> Result<Vec<ProgressEntry>>;

    /// Permanently delete an episode
    async fn delete_episode(&self, container_id: &str, child_id: &str) -> Result<()>;

    /// Overwrite the stored progress of an item
    async fn patch_progress(&self, id: &CompositeId, patch: ProgressPatch) -> Result<()>;
}
