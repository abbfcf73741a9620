//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing loaded
    Empty,

    /// Session requested or transport preparing
    Loading,

    /// Loaded, paused or playing
    Ready,

    /// End of media observed, not yet advanced
    Ended,
}

/// User actions and remote media-key commands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlaybackIntent {
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    SkipForward,
    SkipBackward,
    /// Absolute position in seconds
    Seek(f64),
    Stop,
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seconds between periodic progress syncs while playing (default: 30)
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Seconds moved by skip forward/backward (default: 15)
    #[serde(default = "default_skip_interval_secs")]
    pub skip_interval_secs: f64,

    /// Maximum items fetched per listing (default: 25)
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Library media type that gets the recent-episodes listing
    #[serde(default = "default_episodic_media_type")]
    pub episodic_media_type: String,
}

impl PlaybackConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: default_sync_interval_secs(),
            skip_interval_secs: default_skip_interval_secs(),
            list_limit: default_list_limit(),
            episodic_media_type: default_episodic_media_type(),
        }
    }
}

fn default_sync_interval_secs() -> u64 {
    30
}

fn default_skip_interval_secs() -> f64 {
    15.0
}

fn default_list_limit() -> usize {
    25
}

fn default_episodic_media_type() -> String {
    textcast_core::PODCAST_MEDIA_TYPE.to_string()
}
