//! Error types for the media server client.

use textcast_core::MediaError;
use thiserror::Error;

/// Errors that can occur when talking to an Audiobookshelf-compatible server.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no token available, or token rejected
    #[error("Authentication required")]
    AuthRequired,

    /// Login failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Playback session response carried no audio track
    #[error("No content URL in playback session")]
    NoContentUrl,

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Settings could not be loaded or are invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServerClientError {
    /// Classify a failed `send()`: connection problems and timeouts are
    /// "unreachable", anything else stays a request error.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::ServerUnreachable(err.to_string())
        } else {
            Self::Request(err)
        }
    }

    /// Turn a non-2xx response into an error, consuming the body as message.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        if status.as_u16() == 401 {
            return Self::AuthRequired;
        }
        let message = response.text().await.unwrap_or_default();
        Self::ServerError {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pass 2xx responses through, map everything else.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ServerClientError::from_response(response).await)
    }
}

impl From<::config::ConfigError> for ServerClientError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ServerClientError> for MediaError {
    fn from(err: ServerClientError) -> Self {
        match err {
            ServerClientError::AuthRequired | ServerClientError::AuthFailed(_) => {
                MediaError::Unauthorized
            }
            ServerClientError::ServerError { status, message } => {
                MediaError::Server { status, message }
            }
            ServerClientError::ParseError(message) => MediaError::Parse(message),
            ServerClientError::NoContentUrl => MediaError::NoStreamUrl,
            ServerClientError::Request(e) if e.is_decode() => MediaError::Parse(e.to_string()),
            ServerClientError::Request(e) => MediaError::Network(e.to_string()),
            ServerClientError::ServerUnreachable(message) => MediaError::Network(message),
            ServerClientError::InvalidUrl(message) | ServerClientError::Config(message) => {
                MediaError::Configuration(message)
            }
        }
    }
}

/// Result type for server client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;
