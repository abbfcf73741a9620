//! Authentication against an Audiobookshelf server.

use crate::error::{Result, ServerClientError};
use crate::types::{LoginRequest, LoginResponse};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Login with username and password.
    ///
    /// The API token is returned in `user.token` because the request asks
    /// for it with `x-return-tokens`.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = format!("{}/login", self.base_url);
        debug!(url = %url, username = %username, "Attempting login");

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .header("x-return-tokens", "true")
            .json(&request)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let login_response: LoginResponse = response.json().await.map_err(|e| {
                ServerClientError::ParseError(format!("Failed to parse login response: {}", e))
            })?;

            info!(
                username = %login_response.user.username,
                user_id = %login_response.user.id,
                "Login successful"
            );

            Ok(login_response)
        } else if status.as_u16() == 401 {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Login failed: invalid credentials");
            Err(ServerClientError::AuthFailed(
                "Invalid username or password".to_string(),
            ))
        } else {
            Err(ServerClientError::from_response(response).await)
        }
    }
}
