//! TextCast Server Client
//!
//! HTTP client for Audiobookshelf-compatible media servers. `ShelfClient`
//! implements [`textcast_core::MediaServer`], which is all the playback
//! crate needs.
//!
//! # Features
//!
//! - **Authentication**: login with username/password, stored token reuse
//! - **Listings**: libraries, recent podcast episodes, items in progress
//! - **Progress**: current-user progress, session sync, progress patches
//! - **Sessions**: open a playback session and build the stream URL
//!
//! # Example
//!
//! ```ignore
//! use textcast_server_client::{ClientSettings, ShelfClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ClientSettings::load(Some("textcast.toml".as_ref()))?;
//!     let client = ShelfClient::new(&settings)?;
//!
//!     if !client.test_connection().await? {
//!         return Err("server not reachable".into());
//!     }
//!
//!     let login = client.login("user", "password").await?;
//!     println!("Logged in as {}", login.user.username);
//!
//!     let libraries = client.library().await?.client().get_libraries().await?;
//!     println!("Found {} libraries", libraries.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod library;
mod session;
mod types;

// Re-export main types
pub use client::{LibraryClientHandle, SessionClientHandle, ShelfClient};
pub use config::{ClientSettings, DeviceSettings, ServerSettings};
pub use error::{Result, ServerClientError};
pub use types::{cover_url, DeviceInfo, LoginResponse, LoginUser, ServerConfig};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use library::LibraryClient;
pub use session::SessionClient;
