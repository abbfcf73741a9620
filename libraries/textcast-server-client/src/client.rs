//! Main Audiobookshelf client.

use crate::auth::AuthClient;
use crate::config::ClientSettings;
use crate::error::{Result, ServerClientError};
use crate::library::LibraryClient;
use crate::session::SessionClient;
use crate::types::{cover_url, DeviceInfo, LoginResponse, ServerConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use textcast_core::{
    CompositeId, Library, MediaError, MediaServer, PlaybackSessionInfo, ProgressEntry,
    ProgressPatch, QueueItem, SyncReport,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Client for an Audiobookshelf-compatible server.
///
/// Holds the base URL and API token behind a lock so one client can be
/// shared as `Arc<dyn MediaServer>` while the user logs in or out.
///
/// # Example
///
/// ```ignore
/// use textcast_server_client::{ClientSettings, ShelfClient};
///
/// let client = ShelfClient::new(&ClientSettings::for_url("https://abs.example.com"))?;
/// client.login("user", "password").await?;
/// let libraries = client.library().await?.client().get_libraries().await?;
/// ```
pub struct ShelfClient {
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
    device: DeviceInfo,
    media_player: String,
}

impl ShelfClient {
    /// Create a new client from settings.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        settings.validate()?;

        let url = settings.server.url.trim().trim_end_matches('/').to_string();

        let http = Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(format!(
                "{}/{}",
                settings.device.client_name,
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(ServerClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(ServerConfig {
                url,
                token: settings.server.token.clone(),
            })),
            device: settings.device_info(),
            media_player: settings.device.media_player.clone(),
        })
    }

    /// Create a client for a URL with default settings.
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        Self::new(&ClientSettings::for_url(url))
    }

    /// Get the normalized server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client has an API token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.token.is_some()
    }

    /// Check that the server answers at its base URL.
    ///
    /// This does not require authentication.
    pub async fn test_connection(&self) -> Result<bool> {
        let url = self.url().await;
        debug!(url = %url, "Testing server connection");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let reachable = response.status().is_success();
        info!(url = %url, status = %response.status(), reachable, "Connection test finished");
        Ok(reachable)
    }

    /// Login with username and password.
    ///
    /// On success, the API token is stored for subsequent requests.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = self.url().await;

        let auth_client = AuthClient::new(&self.http, &url);
        let response = auth_client.login(username, password).await?;

        self.config.write().await.token = Some(response.user.token.clone());

        Ok(response)
    }

    /// Set the token directly (e.g., from stored credentials).
    pub async fn set_token(&self, token: impl Into<String>) {
        self.config.write().await.token = Some(token.into());
    }

    /// Get the current token.
    pub async fn token(&self) -> Option<String> {
        self.config.read().await.token.clone()
    }

    /// Clear the stored token (logout).
    pub async fn logout(&self) {
        self.config.write().await.token = None;
        info!("Logged out");
    }

    /// Cover image URL for a library item.
    pub async fn cover_url(&self, library_item_id: &str) -> String {
        cover_url(&self.url().await, library_item_id)
    }

    async fn credentials(&self) -> Result<(String, String)> {
        let config = self.config.read().await;
        let token = config.token.clone().ok_or(ServerClientError::AuthRequired)?;
        Ok((config.url.clone(), token))
    }

    /// Get a library client for listing operations.
    ///
    /// Returns an error if not authenticated.
    pub async fn library(&self) -> Result<LibraryClientHandle> {
        let (url, token) = self.credentials().await?;
        Ok(LibraryClientHandle {
            http: self.http.clone(),
            url,
            token,
        })
    }

    /// Get a session client for playback and progress operations.
    ///
    /// Returns an error if not authenticated.
    pub async fn session(&self) -> Result<SessionClientHandle> {
        let (url, token) = self.credentials().await?;
        Ok(SessionClientHandle {
            http: self.http.clone(),
            url,
            token,
        })
    }
}

/// Handle for library operations.
///
/// Returned by `ShelfClient::library()`; owns a snapshot of the URL and
/// token taken when it was created.
pub struct LibraryClientHandle {
    http: Client,
    url: String,
    token: String,
}

impl LibraryClientHandle {
    /// Get the library client.
    pub fn client(&self) -> LibraryClient<'_> {
        LibraryClient::new(&self.http, &self.url, &self.token)
    }
}

/// Handle for session operations.
pub struct SessionClientHandle {
    http: Client,
    url: String,
    token: String,
}

impl SessionClientHandle {
    /// Get the session client.
    pub fn client(&self) -> SessionClient<'_> {
        SessionClient::new(&self.http, &self.url, &self.token)
    }
}

#[async_trait]
impl MediaServer for ShelfClient {
    async fn start_playback_session(
        &self,
        id: &CompositeId,
    ) -> textcast_core::Result<PlaybackSessionInfo> {
        let handle = self.session().await?;
        let info = handle
            .client()
            .start(id, self.device.clone(), &self.media_player)
            .await?;
        Ok(info)
    }

    async fn sync_progress(&self, session_id: &str, report: SyncReport) -> textcast_core::Result<()> {
        self.session()
            .await?
            .client()
            .sync(session_id, report)
            .await
            .map_err(MediaError::from)
    }

    async fn list_libraries(&self) -> textcast_core::Result<Vec<Library>> {
        self.library()
            .await?
            .client()
            .get_libraries()
            .await
            .map_err(MediaError::from)
    }

    async fn list_episodic_content(
        &self,
        library_id: &str,
        limit: usize,
    ) -> textcast_core::Result<Vec<QueueItem>> {
        self.library()
            .await?
            .client()
            .get_recent_episodes(library_id, limit)
            .await
            .map_err(MediaError::from)
    }

    async fn list_in_progress(&self, limit: usize) -> textcast_core::Result<Vec<QueueItem>> {
        self.library()
            .await?
            .client()
            .get_items_in_progress(limit)
            .await
            .map_err(MediaError::from)
    }

    async fn fetch_current_user_progress(&self) -> textcast_core::Result<Vec<ProgressEntry>> {
        self.library()
            .await?
            .client()
            .get_user_progress()
            .await
            .map_err(MediaError::from)
    }

    async fn delete_episode(&self, container_id: &str, child_id: &str) -> textcast_core::Result<()> {
        self.session()
            .await?
            .client()
            .delete_episode(container_id, child_id)
            .await
            .map_err(MediaError::from)
    }

    async fn patch_progress(
        &self,
        id: &CompositeId,
        patch: ProgressPatch,
    ) -> textcast_core::Result<()> {
        self.session()
            .await?
            .client()
            .patch_progress(id, patch)
            .await
            .map_err(MediaError::from)
    }
}
