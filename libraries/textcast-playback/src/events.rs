//! Playback Events
//!
//! Queued by the controller and drained by the host to refresh whatever
//! renders the player (now-playing bar, lock screen, logs).

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Controller state changed
    StateChanged { state: PlaybackState },

    /// A different item became current
    ItemChanged {
        id: String,
        previous_id: Option<String>,
    },

    /// Queue contents or cursor changed
    QueueChanged {
        length: usize,
        cursor: Option<usize>,
    },

    /// Metadata for external now-playing surfaces
    NowPlaying {
        title: String,
        author: Option<String>,
    },

    /// Position update (periodic, at most a second apart)
    PositionUpdate {
        current_time: f64,
        duration: f64,
        is_playing: bool,
    },

    /// The server acknowledged a progress sync
    ProgressSynced {
        session_id: String,
        current_time: f64,
        time_listened: f64,
    },

    /// Playback finished the last item of the queue
    EndOfQueue,

    /// Non-fatal problem the user may want to know about
    Warning { message: String },
}
