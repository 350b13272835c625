//! HTTP users listing via reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::{FetchError, UserSource};

/// Fetches the users listing with a single GET.
#[derive(Debug, Clone)]
pub struct HttpUserSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpUserSource {
    /// Build a source for `endpoint`, giving up after `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| FetchError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, endpoint })
    }

    /// Reuse an existing client, e.g. one shared with the chart renderer.
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl UserSource for HttpUserSource {
    async fn fetch_users(&self) -> Result<Value, FetchError> {
        let url = self.endpoint.to_string();
        tracing::debug!(%url, "fetching users listing");

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    fn base_url(&self) -> Option<&Url> {
        Some(&self.endpoint)
    }
}
