// reqwest-backed HttpClient
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use overseer_core::domain::Params;
use overseer_core::port::http_client::{HttpClient, HttpResponse, TransportError};

/// Client tuning
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Whole-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

/// HttpClient over a shared reqwest connection pool
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client
    ///
    /// # Errors
    /// - TransportError::Connect if the TLS backend cannot be initialized
    pub fn new(config: HttpClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Connect(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_builder() {
        TransportError::InvalidUrl(e.to_string())
    } else if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_body() || e.is_decode() {
        TransportError::Body(e.to_string())
    } else {
        TransportError::Connect(e.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, params: &Params) -> Result<HttpResponse, TransportError> {
        debug!(url = %url, params = ?params, "HTTP GET");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(map_error)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        debug!(url = %url, status = status, "HTTP GET completed");

        Ok(HttpResponse { status, body })
    }
}
