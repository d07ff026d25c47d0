//! Mastodon REST client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::api::{NewStatus, Notification, PostedStatus, SocialApi};
use crate::config::BotConfig;
use crate::error::ApiError;

/// Client for a single Mastodon-compatible server, authenticated as the bot.
pub struct MastodonClient {
    base_url: String,
    client_id: String,
    access_token: SecretString,
    client: reqwest::Client,
}

impl MastodonClient {
    pub fn new(config: &BotConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("autoresponder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::RequestFailed {
                endpoint: config.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            access_token: config.access_token.clone(),
            client,
        })
    }

    /// Registered application id this client was configured with.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    /// Decode a response, surfacing `{"error": ...}` bodies as server errors.
    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(ApiError::InvalidResponse {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ApiError::Status {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                });
            }
        };

        if let Some(message) = server_error(&value) {
            return Err(ApiError::Server {
                endpoint: endpoint.to_string(),
                message,
            });
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Extract the message from a Mastodon error body.
fn server_error(value: &serde_json::Value) -> Option<String> {
    let error = value.as_object()?.get("error")?;
    Some(match error.as_str() {
        Some(s) => s.to_string(),
        None => error.to_string(),
    })
}

fn request_failed(endpoint: &str, e: reqwest::Error) -> ApiError {
    ApiError::RequestFailed {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl SocialApi for MastodonClient {
    async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let endpoint = "notifications";
        let resp = self
            .client
            .get(self.api_url(endpoint))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| request_failed(endpoint, e))?;

        Self::decode(endpoint, resp).await
    }

    async fn post_status(&self, status: NewStatus) -> Result<PostedStatus, ApiError> {
        let endpoint = "statuses";
        let resp = self
            .client
            .post(self.api_url(endpoint))
            .bearer_auth(self.access_token.expose_secret())
            .json(&status)
            .send()
            .await
            .map_err(|e| request_failed(endpoint, e))?;

        Self::decode(endpoint, resp).await
    }

    async fn reblog(&self, status_id: u64) -> Result<(), ApiError> {
        let endpoint = format!("statuses/{status_id}/reblog");
        let resp = self
            .client
            .post(self.api_url(&endpoint))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| request_failed(&endpoint, e))?;

        let _: serde_json::Value = Self::decode(&endpoint, resp).await?;
        Ok(())
    }
}
