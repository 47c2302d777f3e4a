//! Probe request and result types
//!
//! A [`ProbeRequest`] describes one HTTP call and the status code that counts
//! as a pass. A [`ProbeResult`] is what a single probe produced; it is built
//! once and only read afterwards.

use crate::HttpMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single HTTP request issued to verify an endpoint's status code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    /// Absolute target URL
    pub url: String,
    /// Verb to dispatch
    pub method: HttpMethod,
    /// Headers attached verbatim to the outgoing request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// JSON payload, only sent for POST and PUT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Status code the caller considers a pass
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

fn default_expected_status() -> u16 {
    200
}

impl ProbeRequest {
    /// Create a request with no headers, no body and an expected status of 200
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
            expected_status: default_expected_status(),
        }
    }

    /// Shorthand for a `GET` request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Shorthand for a `POST` request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Add a single header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add every header from the given map
    pub fn headers(mut self, headers: &BTreeMap<String, String>) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Attach a JSON payload
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the status code that counts as a pass
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// The payload that will actually go on the wire, if any
    pub fn outgoing_body(&self) -> Option<&serde_json::Value> {
        if self.method.carries_body() {
            self.body.as_ref()
        } else {
            None
        }
    }
}

/// Outcome of one probe
///
/// `observed_status` is absent when no HTTP response was obtained, and
/// `error_message` is present exactly when the probe did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// Verb as requested (may be an unsupported one)
    pub method: String,
    /// Target URL
    pub url: String,
    /// Whether the observed status matched the expectation
    pub succeeded: bool,
    /// Status code of the response, if one was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_status: Option<u16>,
    /// Human-readable failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProbeResult {
    /// The response carried the expected status
    pub fn passed(method: impl Into<String>, url: impl Into<String>, status: u16) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            succeeded: true,
            observed_status: Some(status),
            error_message: None,
        }
    }

    /// A response arrived but its status was not the expected one
    pub fn failed_with_status(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            succeeded: false,
            observed_status: Some(status),
            error_message: Some(message.into()),
        }
    }

    /// No response was obtained at all
    pub fn failed(
        method: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            succeeded: false,
            observed_status: None,
            error_message: Some(message.into()),
        }
    }
}
