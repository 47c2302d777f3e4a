//! Network seam of the prober
//!
//! The prober never talks to the network directly; it hands a
//! [`ProbeRequest`] to a [`Transport`] and gets back a status and body text.
//! [`HttpTransport`] is the real implementation; tests plug in doubles.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use schema::{HttpMethod, ProbeRequest};
use tracing::{debug, warn};

use super::ProbeError;
use crate::{CoreError, Result};

/// What came back from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as text (lossy)
    pub body: String,
}

impl TransportResponse {
    /// Create a response from a status and body text
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends exactly one request and returns the response
///
/// Implementations must not retry and must report every failure that happens
/// before a response is obtained as a transport-class [`ProbeError`].
#[async_trait]
pub trait Transport {
    /// Dispatch the request
    async fn send(&self, request: &ProbeRequest) -> std::result::Result<TransportResponse, ProbeError>;
}

/// HTTP/HTTPS transport backed by `reqwest`
///
/// Redirect, timeout and TLS behavior are the client defaults.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with a default client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("routeprobe/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::InitializationError(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ProbeRequest) -> std::result::Result<TransportResponse, ProbeError> {
        let url = parse_target(&request.url)?;

        let mut builder = self.client.request(to_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.outgoing_body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ProbeError::from)?;
        let status = response.status().as_u16();
        debug!(method = %request.method, url = %request.url, status, "response received");

        // An unreadable body degrades to empty; the status still counts.
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(url = %request.url, error = %e, "failed to read response body");
                String::new()
            }
        };

        Ok(TransportResponse { status, body })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Accept only non-empty absolute http(s) URLs
pub fn parse_target(raw: &str) -> std::result::Result<Url, ProbeError> {
    let invalid = |reason: String| ProbeError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    if raw.trim().is_empty() {
        return Err(invalid("empty URL".to_string()));
    }
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
