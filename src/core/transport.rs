//! Fetching raw exposition text for a bridge network
//!
//! The poller only sees the [`MetricsTransport`] trait. Two implementations
//! ship with the crate: [`HttpTransport`] scrapes the configured upstream
//! directly and [`ProxyTransport`] goes through a running `bridge-monitor
//! serve` instance.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::config::{BridgeConfig, ConfigError};
use super::network::Network;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    NotConfigured(#[from] ConfigError),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(" ({})", d),
        None => String::new(),
    }
}

/// Source of raw Prometheus text for a network
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsTransport: Send + Sync {
    async fn fetch(&self, network: Network) -> Result<String, TransportError>;
}

/// Build the shared HTTP client
pub fn build_client(timeout: Duration) -> Result<Client, TransportError> {
    Ok(Client::builder()
        .timeout(timeout)
        .build()?)
}

/// Scrapes the upstream bridge node metrics endpoint directly
pub struct HttpTransport {
    client: Client,
    config: Arc<BridgeConfig>,
}

impl HttpTransport {
    pub fn new(config: Arc<BridgeConfig>) -> Result<Self, TransportError> {
        let client = build_client(config.request_timeout)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MetricsTransport for HttpTransport {
    async fn fetch(&self, network: Network) -> Result<String, TransportError> {
        let url = self.config.upstream_url(network)?;

        let response = self.client
            .get(url)
            .header(ACCEPT, "text/plain")
            .send()
            .await?;

        read_text(response).await
    }
}

/// Fetches through the `/api/metrics` proxy endpoint of `bridge-monitor serve`
pub struct ProxyTransport {
    client: Client,
    base_url: String,
}

impl ProxyTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/metrics", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MetricsTransport for ProxyTransport {
    async fn fetch(&self, network: Network) -> Result<String, TransportError> {
        let response = self.client
            .get(self.endpoint())
            .query(&[("network", network.id())])
            .send()
            .await?;

        read_text(response).await
    }
}

/// Error payload returned by the proxy
#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: String,
    details: Option<String>,
}

impl ProxyErrorBody {
    fn message(self) -> String {
        match self.details {
            Some(details) => format!("{}: {}", self.error, details),
            None => self.error,
        }
    }
}

async fn read_text(response: Response) -> Result<String, TransportError> {
    let status = response.status();

    if !status.is_success() {
        // The body is only informational here; ignore read failures
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ProxyErrorBody>(&body)
            .ok()
            .map(ProxyErrorBody::message);

        return Err(TransportError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(response.text().await?)
}
