//! Feed fetcher
//!
//! One HTTP GET per feed per cycle: no conditional requests, no pagination.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("airq-relay/", env!("CARGO_PKG_VERSION"));

/// Feed fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Source of raw feed documents
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Retrieve the document at `url` as text
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed feed source
pub struct HttpFeedSource {
    http_client: reqwest::Client,
}

impl HttpFeedSource {
    /// Create a client with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url = %url, "Fetching feed");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        tracing::debug!(url = %url, bytes = body.len(), "Feed fetched");
        Ok(body)
    }
}
