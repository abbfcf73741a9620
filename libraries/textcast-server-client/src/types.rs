//! Types for Audiobookshelf API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use textcast_core::{Library, ProgressEntry, ProgressPatch, QueueItem, SyncReport};
use tracing::warn;

/// Connection state for one server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "https://abs.example.com")
    pub url: String,
    /// Current API token (if authenticated)
    pub token: Option<String>,
}

impl ServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
        }
    }

    /// Create a config with an existing token.
    pub fn with_token(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: Some(token.into()),
        }
    }
}

/// Cover image endpoint for a library item (public, no auth needed)
pub fn cover_url(base_url: &str, library_item_id: &str) -> String {
    format!("{}/api/items/{}/cover", base_url, library_item_id)
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for login endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response from successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: LoginUser,
    pub user_default_library_id: Option<String>,
}

/// User block of the login response; carries the API token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

// =============================================================================
// User / Progress Types
// =============================================================================

/// `GET /api/me`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsResponse {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub media_progress: Option<Vec<UserMediaProgress>>,
}

/// One progress record of the current user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMediaProgress {
    pub library_item_id: String,
    pub episode_id: Option<String>,
    pub duration: Option<f64>,
    pub progress: Option<f64>,
    pub current_time: Option<f64>,
    pub is_finished: Option<bool>,
    /// Milliseconds since the Unix epoch
    pub last_update: Option<i64>,
}

impl From<UserMediaProgress> for ProgressEntry {
    fn from(dto: UserMediaProgress) -> Self {
        Self {
            container_id: dto.library_item_id,
            child_id: dto.episode_id,
            duration: dto.duration.unwrap_or(0.0),
            progress: dto.progress.unwrap_or(0.0),
            current_time: dto.current_time.unwrap_or(0.0),
            is_finished: dto.is_finished.unwrap_or(false),
            last_update: dto.last_update.and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}

// =============================================================================
// Library Types
// =============================================================================

/// `GET /api/libraries`
#[derive(Debug, Deserialize)]
pub struct LibrariesResponse {
    pub libraries: Vec<LibraryDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDto {
    pub id: String,
    pub name: String,
    pub media_type: String,
}

impl From<LibraryDto> for Library {
    fn from(dto: LibraryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            media_type: dto.media_type,
        }
    }
}

/// `GET /api/libraries/{id}/recent-episodes`
#[derive(Debug, Deserialize)]
pub struct RecentEpisodesResponse {
    pub episodes: Vec<RecentEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEpisode {
    pub id: String,
    pub library_item_id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub podcast: Option<PodcastMinimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodcastMinimal {
    pub metadata: Option<PodcastMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodcastMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl RecentEpisode {
    /// Convert to a zero-progress queue item.
    ///
    /// The id is `"{libraryItemId}/{episodeId}"`, or the bare episode id when
    /// the server omitted the library item.
    pub fn into_queue_item(self, base_url: &str) -> QueueItem {
        let metadata = self.podcast.and_then(|p| p.metadata);
        let author = metadata
            .as_ref()
            .and_then(|m| m.author.clone().or_else(|| m.title.clone()))
            .unwrap_or_else(|| "Unknown Podcast".to_string());

        let id = match &self.library_item_id {
            Some(library_item_id) => format!("{}/{}", library_item_id, self.id),
            None => {
                warn!(episode_id = %self.id, "Episode has no library item id, using bare episode id");
                self.id.clone()
            }
        };

        let mut item = QueueItem::new(
            id,
            self.title.unwrap_or_else(|| "Unknown Episode".to_string()),
            self.duration.unwrap_or(0.0),
        )
        .with_author(author);

        if let Some(library_item_id) = &self.library_item_id {
            item = item.with_cover_url(cover_url(base_url, library_item_id));
        }
        item
    }
}

/// `GET /api/me/items-in-progress`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsInProgressResponse {
    pub library_items: Vec<InProgressItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgressItem {
    pub id: String,
    pub library_id: Option<String>,
    pub media: ItemMedia,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemMedia {
    pub metadata: ItemMetadata,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub author_name: Option<String>,
}

impl InProgressItem {
    /// Convert to a zero-progress queue item.
    pub fn into_queue_item(self, base_url: &str) -> QueueItem {
        let metadata = self.media.metadata;
        let author = metadata
            .author_name
            .or(metadata.author)
            .unwrap_or_else(|| "Unknown Author".to_string());

        QueueItem::new(
            self.id.clone(),
            metadata.title.unwrap_or_else(|| "Unknown Title".to_string()),
            self.media.duration.unwrap_or(0.0),
        )
        .with_author(author)
        .with_cover_url(cover_url(base_url, &self.id))
    }
}

// =============================================================================
// Playback Session Types
// =============================================================================

/// Device block sent when opening a playback session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: String,
    pub client_name: String,
    pub manufacturer: String,
    pub model: String,
}

/// Body of `POST /api/items/{id}/play[/{episodeId}]`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub device_info: DeviceInfo,
    pub force_direct_play: bool,
    pub force_transcode: bool,
    pub media_player: String,
}

impl PlayRequest {
    pub fn direct(device_info: DeviceInfo, media_player: impl Into<String>) -> Self {
        Self {
            device_info,
            force_direct_play: true,
            force_transcode: false,
            media_player: media_player.into(),
        }
    }
}

/// Subset of the playback session the client needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySessionResponse {
    pub id: String,
    #[serde(default)]
    pub audio_tracks: Vec<AudioTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTrack {
    pub content_url: Option<String>,
}

impl PlaySessionResponse {
    /// Content URL of the first audio track
    pub fn content_url(&self) -> Option<&str> {
        self.audio_tracks
            .first()
            .and_then(|track| track.content_url.as_deref())
    }
}

/// Body of `POST /api/session/{id}/sync`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub current_time: f64,
    pub duration: f64,
    pub time_listened: f64,
}

impl From<SyncReport> for SyncRequest {
    fn from(report: SyncReport) -> Self {
        Self {
            current_time: report.current_time,
            duration: report.duration,
            time_listened: report.time_listened,
        }
    }
}

/// Body of `PATCH /api/me/progress/{id}[/{episodeId}]`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatchRequest {
    pub is_finished: bool,
    pub current_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl From<ProgressPatch> for ProgressPatchRequest {
    fn from(patch: ProgressPatch) -> Self {
        Self {
            is_finished: patch.is_finished,
            current_time: patch.current_time,
            duration: patch.duration,
            progress: patch.progress(),
        }
    }
}
