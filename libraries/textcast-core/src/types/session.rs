use serde::{Deserialize, Serialize};

/// Result of starting a server-side playback session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSessionInfo {
    /// Opaque server-issued session id
    pub session_id: String,

    /// Fully qualified URL the transport can stream
    pub stream_url: String,
}

/// Listening position reported to an open session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Position in seconds
    pub current_time: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Total seconds listened in this session
    pub time_listened: f64,
}

/// Progress mutation sent for an item outside any playback session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressPatch {
    pub is_finished: bool,

    /// Position in seconds
    pub current_time: f64,

    /// Duration in seconds, when known
    pub duration: Option<f64>,
}

impl ProgressPatch {
    /// Mark an item finished at its end
    pub fn finished(duration: f64) -> Self {
        Self {
            is_finished: true,
            current_time: duration,
            duration: Some(duration),
        }
    }

    /// Reset an item to the beginning
    pub fn restart(duration: f64) -> Self {
        Self {
            is_finished: false,
            current_time: 0.0,
            duration: Some(duration),
        }
    }

    /// Fraction implied by the patch, when a duration is present
    pub fn progress(&self) -> Option<f64> {
        self.duration.map(|duration| {
            if duration > 0.0 {
                self.current_time / duration
            } else {
                0.0
            }
        })
    }
}
