//! The route prober: one request in, one pass/fail verdict out

use schema::{HttpMethod, ProbeRequest, ProbeResult};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{ProbeError, Transport, TransportResponse};

/// Response bodies quoted in failure messages are cut to this many characters
pub const BODY_EXCERPT_LIMIT: usize = 512;

/// Issues probes through a [`Transport`] and judges the status codes
///
/// Failures of any kind are folded into the returned [`ProbeResult`];
/// nothing here returns an error or panics on a bad response, so a run of
/// probes always continues past a broken endpoint.
#[derive(Debug, Clone)]
pub struct RouteProber<T> {
    transport: T,
}

impl<T> RouteProber<T>
where
    T: Transport + Send + Sync,
{
    /// Create a prober over the given transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch one request and compare its status to the expectation
    pub async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        debug!(method = %request.method, url = %request.url, expected = request.expected_status, "probing");
        let outcome = self.transport.send(request).await;
        evaluate(request, outcome)
    }

    /// Probe with a verb given as text
    ///
    /// An unsupported verb produces a failed result without touching the
    /// transport.
    pub async fn probe_route(
        &self,
        method: &str,
        url: &str,
        headers: &BTreeMap<String, String>,
        body: Option<&serde_json::Value>,
        expected_status: u16,
    ) -> ProbeResult {
        let verb = match method.parse::<HttpMethod>() {
            Ok(verb) => verb,
            Err(e) => {
                let err = ProbeError::from(e);
                warn!(method, url, "{}", err);
                return ProbeResult::failed(method.trim(), url, err.to_string());
            }
        };

        let mut request = ProbeRequest::new(verb, url)
            .headers(headers)
            .expect_status(expected_status);
        if let Some(body) = body {
            request = request.json(body.clone());
        }
        self.probe(&request).await
    }

    /// Send a request and hand back the raw response
    ///
    /// Used where the caller needs the body itself, e.g. to pull a token out
    /// of a login response.
    pub async fn exchange(&self, request: &ProbeRequest) -> Result<TransportResponse, ProbeError> {
        debug!(method = %request.method, url = %request.url, "exchanging");
        self.transport.send(request).await
    }
}

/// Turn a transport outcome into a verdict for `request`
pub fn evaluate(
    request: &ProbeRequest,
    outcome: Result<TransportResponse, ProbeError>,
) -> ProbeResult {
    let method = request.method.as_str();
    match outcome {
        Ok(response) if response.status == request.expected_status => {
            debug!(method, url = %request.url, status = response.status, "probe passed");
            ProbeResult::passed(method, &request.url, response.status)
        }
        Ok(response) => {
            let err = ProbeError::StatusMismatch {
                expected: request.expected_status,
                observed: response.status,
                body: body_excerpt(&response.body),
            };
            warn!(method, url = %request.url, status = response.status, "probe failed: unexpected status");
            ProbeResult::failed_with_status(method, &request.url, response.status, err.to_string())
        }
        Err(err) if err.is_transport() => {
            warn!(method, url = %request.url, error = %err, "probe failed: no response");
            ProbeResult::failed(method, &request.url, err.to_string())
        }
        Err(err) => {
            warn!(method, url = %request.url, error = %err, "probe failed");
            ProbeResult::failed(method, &request.url, err.to_string())
        }
    }
}

/// Trimmed response body, cut to [`BODY_EXCERPT_LIMIT`] characters
pub fn body_excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "(empty body)".to_string();
    }
    match body.char_indices().nth(BODY_EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}
