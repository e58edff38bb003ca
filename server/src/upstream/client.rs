//! HTTP client for list endpoints of the upstream backend.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use console_engine::{unwrap_with_envelope, Record};
use reqwest::{Client, StatusCode};

use crate::catalog::ResourceSpec;

/// Extra query parameters forwarded verbatim to the upstream endpoint
/// (date ranges and similar server-side narrowing).
pub type FetchHints = BTreeMap<String, String>;

/// Errors from fetching a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream rejected the credentials")]
    Unauthorized,

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error(transparent)]
    Malformed(#[from] console_engine::Error),
}

/// A source of record snapshots.
pub trait RecordSource: Send + Sync {
    /// Fetch the full record set of `resource`.
    fn fetch_records(
        &self,
        resource: &ResourceSpec,
        token: Option<&str>,
        hints: &FetchHints,
    ) -> impl Future<Output = Result<Vec<Record>, UpstreamError>> + Send;
}

/// Upstream REST client.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Get the base URL for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a resource endpoint.
    pub fn endpoint_url(&self, resource: &ResourceSpec) -> String {
        format!("{}{}", self.base_url, resource.endpoint)
    }
}

impl RecordSource for UpstreamClient {
    async fn fetch_records(
        &self,
        resource: &ResourceSpec,
        token: Option<&str>,
        hints: &FetchHints,
    ) -> Result<Vec<Record>, UpstreamError> {
        let url = self.endpoint_url(resource);
        let mut request = self.client.get(&url).query(hints);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(resource = resource.name, url = %url, "Fetching snapshot");
        let response = request.send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(UpstreamError::Unauthorized)
            }
            status if !status.is_success() => return Err(UpstreamError::Status(status.as_u16())),
            _ => {}
        }

        let body: serde_json::Value = response.json().await?;
        let (records, envelope) = unwrap_with_envelope(body)?;

        tracing::debug!(
            resource = resource.name,
            count = records.len(),
            envelope = ?envelope,
            "Fetched snapshot"
        );

        Ok(records)
    }
}
