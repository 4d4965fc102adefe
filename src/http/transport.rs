//! HTTP transport
//!
//! [`Transport`] is the seam between request construction and the network.
//! [`HttpTransport`] sends requests with reqwest, attaching the bearer token
//! and waiting on the rate limiter first. Responses come back raw; status
//! classification happens in the table client.

use super::rate_limit::RateLimiter;
use crate::classify::ApiError;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::request::ApiRequest;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

/// Status and body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response
///
/// Implementations return `Err` only when no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse>;
}

/// reqwest-backed transport with authentication and rate limiting
pub struct HttpTransport {
    client: Client,
    rate_limiter: Option<RateLimiter>,
}

impl HttpTransport {
    /// Build a transport from a validated configuration
    pub fn new(config: &Configuration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| Error::config("API key contains invalid header characters"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(format!("airtable-client/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
        })
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        debug!("{} {}", request.method, request.url);

        let mut req = self.client.request(request.method.into(), &request.url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        debug!("{} {} answered {}", request.method, request.url, status);
        Ok(TransportResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    ApiError::transport(e.to_string(), e.is_timeout() || e.is_connect()).into()
}
