//! HTTP transport: a single `GET` returning the raw status and body.
//!
//! The pipeline never talks to `reqwest` directly. Every stage goes through
//! the [`Transport`] trait so tests (and callers with their own HTTP stack)
//! can inject a replacement via
//! [`crate::config::ExtractionConfigBuilder::transport`].
//!
//! The transport reports network failures only. Status codes are handed back
//! untouched; [`fetch_checked`] is where the `[200, 300)` rule lives.

use crate::config::ExtractionConfig;
use crate::error::WenkuError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Raw response of a single GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// `true` for statuses in the inclusive-exclusive range `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A blocking-free HTTP GET.
///
/// Implementations must return [`WenkuError::Transport`] when the request
/// itself fails and must not interpret the status code.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<HttpResponse, WenkuError>;
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honouring the configured timeout and user agent.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, WenkuError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| WenkuError::Internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, url: &str) -> Result<HttpResponse, WenkuError> {
        let transport_err = |e: reqwest::Error| WenkuError::Transport {
            url: url.to_string(),
            reason: if e.is_timeout() {
                format!("timed out: {e}")
            } else {
                e.to_string()
            },
        };

        let response = self.client.get(url).send().await.map_err(transport_err)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_err)?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// GET `url` and reject any status outside `[200, 300)`.
pub async fn fetch_checked(transport: &dyn Transport, url: &str) -> Result<Vec<u8>, WenkuError> {
    let response = transport.fetch(url).await?;
    if !response.is_success() {
        return Err(WenkuError::PageFetch {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}
