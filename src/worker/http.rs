//! HTTP client for fetching response bodies

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::digest::DigestError;

pub type Result<T> = std::result::Result<T, DigestError>;

/// Retrieves the full body behind a URL.
///
/// Implementations classify failures into [`DigestError`] variants: transport
/// problems and status codes >= 400 are HTTP errors, a body that cannot be
/// read is a byte error.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("digester/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// reqwest-backed fetcher shared by every worker of a run
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DigestError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes> {
        debug!(url, "Starting fetch");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DigestError::Timeout(timeout)
                } else {
                    DigestError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        // hyper accepts codes up to 999; everything from 400 up is a failure
        if status.as_u16() >= 400 {
            return Err(DigestError::Status(status.as_u16()));
        }

        // The per-request timeout covers the body as well, but a stalled
        // body still reads as a byte error.
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DigestError::Body(e.to_string()))?;

        debug!(url, size = bytes.len(), "Fetch completed");

        Ok(bytes)
    }
}
