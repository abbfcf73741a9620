/// Client settings
use crate::error::{Result, ServerClientError};
use crate::types::DeviceInfo;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_device")]
    pub device: DeviceSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub url: String,

    /// Stored API token, if the user logged in before
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceSettings {
    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_device_id")]
    pub device_id: String,

    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Reported as `mediaPlayer` when opening a session
    #[serde(default = "default_media_player")]
    pub media_player: String,
}

impl ClientSettings {
    /// Settings for a server URL with every other field defaulted
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            server: ServerSettings {
                url: url.into(),
                ..default_server()
            },
            device: default_device(),
        }
    }

    /// Load settings from an optional TOML file, then the environment.
    ///
    /// Environment variables use the `TEXTCAST_` prefix and `__` between
    /// sections, e.g. `TEXTCAST_SERVER__URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = ::config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(::config::File::from(path).required(false));
        }

        settings = settings.add_source(
            ::config::Environment::with_prefix("TEXTCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = settings.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(ServerClientError::Config(
                "Server URL is required (set TEXTCAST_SERVER__URL)".to_string(),
            ));
        }

        let parsed = url::Url::parse(url)
            .map_err(|e| ServerClientError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.server.connect_timeout_secs)
    }

    /// Device block for playback session requests
    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            device_id: self.device.device_id.clone(),
            client_name: self.device.client_name.clone(),
            manufacturer: self.device.manufacturer.clone(),
            model: self.device.model.clone(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::for_url(String::new())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: String::new(),
        token: None,
        request_timeout_secs: default_request_timeout_secs(),
        connect_timeout_secs: default_connect_timeout_secs(),
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_device() -> DeviceSettings {
    DeviceSettings {
        client_name: default_client_name(),
        device_id: default_device_id(),
        manufacturer: default_manufacturer(),
        model: default_model(),
        media_player: default_media_player(),
    }
}

fn default_client_name() -> String {
    "TextCast".to_string()
}

fn default_device_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_manufacturer() -> String {
    "Unknown".to_string()
}

fn default_model() -> String {
    std::env::consts::OS.to_string()
}

fn default_media_player() -> String {
    "TextCast".to_string()
}
