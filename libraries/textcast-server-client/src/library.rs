//! Library listings and user progress.

use crate::error::{ensure_success, Result, ServerClientError};
use crate::types::{
    ItemsInProgressResponse, LibrariesResponse, RecentEpisodesResponse, UserDetailsResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use textcast_core::{Library, ProgressEntry, QueueItem};
use tracing::debug;

/// Read-only library client.
pub struct LibraryClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: &'a str,
}

impl<'a> LibraryClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, token: &'a str) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        ensure_success(response).await?.json().await.map_err(|e| {
            ServerClientError::ParseError(format!("Failed to parse {}: {}", what, e))
        })
    }

    /// Current user's progress on every item they have touched.
    pub async fn get_user_progress(&self) -> Result<Vec<ProgressEntry>> {
        let url = format!("{}/api/me", self.base_url);
        debug!(url = %url, "Fetching current user");

        let user: UserDetailsResponse = self.get_json(&url, "user details").await?;
        let entries: Vec<ProgressEntry> = user
            .media_progress
            .unwrap_or_default()
            .into_iter()
            .map(ProgressEntry::from)
            .collect();

        debug!(
            username = %user.username,
            progress_items = entries.len(),
            "Fetched user details"
        );
        Ok(entries)
    }

    /// All libraries visible to the user.
    pub async fn get_libraries(&self) -> Result<Vec<Library>> {
        let url = format!("{}/api/libraries", self.base_url);
        debug!(url = %url, "Fetching libraries");

        let response: LibrariesResponse = self.get_json(&url, "libraries").await?;
        Ok(response.libraries.into_iter().map(Library::from).collect())
    }

    /// Most recent episodes of a podcast library.
    pub async fn get_recent_episodes(&self, library_id: &str, limit: usize) -> Result<Vec<QueueItem>> {
        let url = format!(
            "{}/api/libraries/{}/recent-episodes?limit={}",
            self.base_url, library_id, limit
        );
        debug!(url = %url, "Fetching recent episodes");

        let response: RecentEpisodesResponse = self.get_json(&url, "recent episodes").await?;
        let items: Vec<QueueItem> = response
            .episodes
            .into_iter()
            .map(|episode| episode.into_queue_item(self.base_url))
            .collect();

        debug!(library_id = %library_id, episodes = items.len(), "Fetched recent episodes");
        Ok(items)
    }

    /// Items the user has started listening to.
    pub async fn get_items_in_progress(&self, limit: usize) -> Result<Vec<QueueItem>> {
        let url = format!("{}/api/me/items-in-progress?limit={}", self.base_url, limit);
        debug!(url = %url, "Fetching items in progress");

        let response: ItemsInProgressResponse = self.get_json(&url, "items in progress").await?;
        Ok(response
            .library_items
            .into_iter()
            .map(|item| item.into_queue_item(self.base_url))
            .collect())
    }
}
