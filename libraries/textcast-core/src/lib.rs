//! TextCast Core
//!
//! Platform-agnostic types, the media server contract, and error handling
//! shared by the TextCast playback and server-client crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `QueueItem`, `CompositeId`, `ProgressIndex`, `Library`
//! - **Core Traits**: `MediaServer`, the seam between playback logic and HTTP
//! - **Error Handling**: Unified `MediaError` and `Result` types
//! - **Diagnostics**: a `tracing` layer capturing logs into a bounded buffer
//!
//! # Example
//!
//! ```rust
//! use textcast_core::types::{CompositeId, QueueItem};
//!
//! let item = QueueItem::new("li_1/ep_1", "Episode 1", 3600.0)
//!     .with_author("Host")
//!     .with_progress(1800.0, 0.5);
//!
//! assert_eq!(item.progress_text(), "30m / 1h 0m (50%)");
//! assert_eq!(CompositeId::parse(&item.id).child(), Some("ep_1"));
//! ```

#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use diagnostics::{DiagnosticsLayer, LogBuffer, LogEntry, DEFAULT_LOG_CAPACITY};
pub use error::{MediaError, Result};
pub use traits::MediaServer;

pub use types::{
    find_episodic, format_duration, CompositeId, Library, PlaybackSessionInfo, ProgressEntry,
    ProgressIndex, ProgressPatch, QueueItem, SyncReport, ID_SEPARATOR, PODCAST_MEDIA_TYPE,
};
