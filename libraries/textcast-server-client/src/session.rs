//! Playback sessions and progress mutations.

use crate::error::{ensure_success, Result, ServerClientError};
use crate::types::{
    DeviceInfo, PlayRequest, PlaySessionResponse, ProgressPatchRequest, SyncRequest,
};
use reqwest::Client;
use textcast_core::{CompositeId, PlaybackSessionInfo, ProgressPatch, SyncReport};
use tracing::{debug, error, info};

/// Client for session lifecycle and per-item progress.
pub struct SessionClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: &'a str,
}

impl<'a> SessionClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, token: &'a str) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Open a playback session and build the authenticated stream URL.
    ///
    /// `POST /api/items/{container}/play` for single-file items,
    /// `POST /api/items/{container}/play/{child}` for episodes.
    pub async fn start(
        &self,
        id: &CompositeId,
        device_info: DeviceInfo,
        media_player: &str,
    ) -> Result<PlaybackSessionInfo> {
        let url = match id.child() {
            Some(child) => format!(
                "{}/api/items/{}/play/{}",
                self.base_url,
                id.container(),
                child
            ),
            None => format!("{}/api/items/{}/play", self.base_url, id.container()),
        };
        info!(
            url = %url,
            container_id = %id.container(),
            child_id = ?id.child(),
            "Starting playback session"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token)
            .json(&PlayRequest::direct(device_info, media_player))
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let session: PlaySessionResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                ServerClientError::ParseError(format!("Failed to parse playback session: {}", e))
            })?;

        let Some(content_url) = session.content_url() else {
            error!(session_id = %session.id, "No content URL in playback session response");
            return Err(ServerClientError::NoContentUrl);
        };

        let mut stream_url = url::Url::parse(&format!("{}{}", self.base_url, content_url))
            .map_err(|e| {
                ServerClientError::InvalidUrl(format!("{}{}: {}", self.base_url, content_url, e))
            })?;
        stream_url.query_pairs_mut().append_pair("token", self.token);
        let stream_url = String::from(stream_url);

        info!(session_id = %session.id, content_url = %content_url, "Playback session started");

        Ok(PlaybackSessionInfo {
            session_id: session.id,
            stream_url,
        })
    }

    /// `POST /api/session/{id}/sync`
    pub async fn sync(&self, session_id: &str, report: SyncReport) -> Result<()> {
        let url = format!("{}/api/session/{}/sync", self.base_url, session_id);
        debug!(url = %url, current_time = report.current_time, "Syncing progress");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token)
            .json(&SyncRequest::from(report))
            .send()
            .await
            .map_err(ServerClientError::from_send)?;
        ensure_success(response).await?;

        info!(
            session_id = %session_id,
            current_time = report.current_time,
            duration = report.duration,
            time_listened = report.time_listened,
            "Synced progress"
        );
        Ok(())
    }

    /// Permanently delete a podcast episode.
    ///
    /// `DELETE /api/podcasts/{container}/episode/{child}`
    pub async fn delete_episode(&self, container_id: &str, child_id: &str) -> Result<()> {
        let url = format!(
            "{}/api/podcasts/{}/episode/{}",
            self.base_url, container_id, child_id
        );
        debug!(url = %url, "Deleting episode");

        let response = self
            .http
            .delete(&url)
            .bearer_auth(self.token)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;
        ensure_success(response).await?;

        info!(container_id = %container_id, child_id = %child_id, "Deleted episode");
        Ok(())
    }

    /// `PATCH /api/me/progress/{container}[/{child}]`
    pub async fn patch_progress(&self, id: &CompositeId, patch: ProgressPatch) -> Result<()> {
        let mut url = format!("{}/api/me/progress/{}", self.base_url, id.container());
        if let Some(child) = id.child() {
            url.push('/');
            url.push_str(child);
        }
        debug!(url = %url, "Updating media progress");

        let response = self
            .http
            .patch(&url)
            .bearer_auth(self.token)
            .json(&ProgressPatchRequest::from(patch))
            .send()
            .await
            .map_err(ServerClientError::from_send)?;
        ensure_success(response).await?;

        info!(
            item_id = %id,
            is_finished = patch.is_finished,
            current_time = patch.current_time,
            "Updated progress"
        );
        Ok(())
    }
}
