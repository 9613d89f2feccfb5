use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{DataKind, League};

/// Failure of a single fetch. Scoped to one tick of one feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network unreachable, connection reset, timeout
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// Body could not be decoded into the expected shape
    #[error("malformed payload: {0}")]
    Parse(String),
}

/// Trait that every feed source must implement.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current payload for `league`.
    async fn fetch(&self, league: League) -> Result<serde_json::Value, FetchError>;

    /// Data kind this source produces.
    fn kind(&self) -> DataKind;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

pub(crate) fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    use anyhow::Context;
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sportsfeed-bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and decode the body as JSON.
pub(crate) async fn get_json(http: &Client, url: &str) -> Result<serde_json::Value, FetchError> {
    let body = get_text(http, url).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
}

/// GET `url` and return the raw body.
pub(crate) async fn get_text(http: &Client, url: &str) -> Result<String, FetchError> {
    // query strings carry API keys
    debug!("GET {}", url.split('?').next().unwrap_or(url));
    let resp = http.get(url).send().await.map_err(FetchError::Transport)?;

    if !resp.status().is_success() {
        return Err(FetchError::Status(resp.status()));
    }

    resp.text().await.map_err(FetchError::Transport)
}
