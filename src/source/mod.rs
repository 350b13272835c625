//! UserSource trait and the users listing fetch.
//!
//! Abstracts where the users listing comes from so the selector can be
//! driven by a live API in production and canned data in tests.

pub mod http;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

use crate::models::DirectoryError;

pub use http::HttpUserSource;

/// Errors while loading the users listing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid users endpoint `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed users listing: {0}")]
    Malformed(String),

    #[error("malformed users listing: {0}")]
    Directory(#[from] DirectoryError),
}

/// Provider of the raw users listing.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Fetch the listing body: a JSON array of user records.
    async fn fetch_users(&self) -> Result<Value, FetchError>;

    /// URL relative avatar paths are resolved against, if any.
    fn base_url(&self) -> Option<&Url> {
        None
    }
}

/// Source serving a fixed body. Useful for embedding and offline runs.
#[derive(Debug, Clone)]
pub struct StaticUserSource {
    body: Value,
}

impl StaticUserSource {
    pub fn new(body: Value) -> Self {
        Self { body }
    }
}

#[async_trait]
impl UserSource for StaticUserSource {
    async fn fetch_users(&self) -> Result<Value, FetchError> {
        Ok(self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn static_source_returns_body() {
        let source = StaticUserSource::new(json!([{"id": 1, "name": "A"}]));
        assert_eq!(source.fetch_users().await.unwrap(), json!([{"id": 1, "name": "A"}]));
        assert!(source.base_url().is_none());
    }

    #[test]
    fn directory_errors_read_as_malformed() {
        let err = FetchError::from(DirectoryError::NotAnObject { index: 3 });
        assert_eq!(
            err.to_string(),
            "malformed users listing: user record #3 is not a JSON object"
        );
    }
}
