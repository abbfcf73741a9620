/// Core error types for TextCast
use thiserror::Error;

/// Result type alias using `MediaError`
pub type Result<T> = std::result::Result<T, MediaError>;

/// Failures reported by a media server collaborator.
///
/// Callers decide visibility per operation: listing failures are shown to
/// the user, sync and mutation confirmations are only logged, and
/// `Cancelled` is always swallowed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    /// Missing or rejected credential
    #[error("Unauthorized - please log in again")]
    Unauthorized,

    /// Transport failure (connection refused, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the server
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Request superseded by a newer one
    #[error("Request cancelled")]
    Cancelled,

    /// Composite identifier without the expected `container/child` shape
    #[error("Invalid item ID format: {0}")]
    MalformedIdentifier(String),

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Parse(String),

    /// Playback session started but carried no playable track
    #[error("No stream URL in playback session")]
    NoStreamUrl,

    /// Client settings are unusable (bad server URL, missing values)
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl MediaError {
    /// Create a server error
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// True for superseded requests, which are never surfaced
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True when the credential is missing or was rejected
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
