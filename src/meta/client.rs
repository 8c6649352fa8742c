//! HTTP client for the release metadata endpoints.
//!
//! All three network calls of a run go through [`MetaClient`]: the manifest,
//! per-version metadata and the artifact body. There is no retry; a failed
//! call is reported to the stage that made it.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failures of a single GET.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct MetaClient {
    client: Client,
}

impl Default for MetaClient {
    fn default() -> Self {
        Self::new(concat!("blockhost/", env!("CARGO_PKG_VERSION")))
    }
}

impl MetaClient {
    pub fn new(user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { client }
    }

    /// GET `url`, failing on any non-success status.
    pub async fn get(&self, url: &str) -> Result<Response, FetchError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::NOT_FOUND {
            Err(FetchError::NotFound(url.to_string()))
        } else {
            Err(FetchError::Status {
                status,
                url: url.to_string(),
            })
        }
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get(url).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
