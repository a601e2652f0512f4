//! Flight provider access.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use flight_protocol::{Method, UpstreamRequest};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

/// The provider could not be reached or the response could not be read.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Status and raw body of a provider response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can answer a flight-search request.
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Issue `request` once. Non-2xx statuses are returned, not raised.
    async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}

/// Skydio cloud API client.
pub struct SkydioClient {
    client: Client,
}

impl SkydioClient {
    /// Create a client. Only connection setup is bounded here; the caller
    /// owns the overall request deadline.
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FlightSource for SkydioClient {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
        };

        for (name, value) in &request.headers {
            let mut header = reqwest::header::HeaderValue::from_str(value.expose())
                .map_err(|_| TransportError(format!("Header {} has an invalid value", name)))?;
            header.set_sensitive(value.is_sensitive());
            builder = builder.header(*name, header);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(format!("Failed to read response body: {}", e)))?;

        debug!(status = status, bytes = body.len(), "Upstream responded");

        Ok(UpstreamResponse { status, body })
    }
}
