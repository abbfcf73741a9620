//! TextCast - Playback Management
//!
//! Platform-agnostic playback queue and progress synchronization.
//!
//! This crate provides:
//! - A play queue with a cursor that survives removals
//! - A playback controller (`Empty -> Loading -> Ready -> Ended`) that
//!   opens a server session per item, resumes at the last known position,
//!   and advances automatically at the end of each item
//! - Listening-time tracking with periodic and on-pause progress sync
//! - A queue list controller that fetches the browsable listing and applies
//!   delete / mark-finished / restart optimistically
//!
//! # Architecture
//!
//! `textcast-playback` has no HTTP or audio code of its own:
//! - The media server is any [`textcast_core::MediaServer`]
//! - The platform player is any [`MediaTransport`]
//!
//! The controller is the single owner of queue, session and transport
//! state. Hosts either call it directly through `&mut` or hand it to
//! [`PlaybackController::run`], which serializes user intents and transport
//! events on one task.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use textcast_playback::{PlaybackConfig, PlaybackController, QueueListController};
//! use textcast_core::ProgressIndex;
//!
//! let server = Arc::new(ShelfClient::new(&settings)?);
//! let list = QueueListController::new(server.clone(), PlaybackConfig::default());
//! let mut player = PlaybackController::new(server, Box::new(platform_player), PlaybackConfig::default());
//!
//! let mut progress = ProgressIndex::new();
//! list.refresh(&mut progress).await;
//!
//! if let Some(first) = list.items().first() {
//!     list.play_from(&first.id, &mut player).await?;
//! }
//!
//! for event in player.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod events;
pub mod listing;
pub mod queue;
pub mod session;
pub mod transport;
pub mod types;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use listing::QueueListController;
pub use queue::{PlaybackQueue, Removal};
pub use session::{PendingSync, SessionTracker};
pub use transport::{AdapterSignal, MediaTransport, TransportAdapter, TransportEvent};
pub use types::{PlaybackConfig, PlaybackIntent, PlaybackState};
