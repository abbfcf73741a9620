//! Error types for playback management

use textcast_core::MediaError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No item is currently loaded
    #[error("No item loaded")]
    NoItemLoaded,

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Item is not in the list
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Media server failure that the caller has to see
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
