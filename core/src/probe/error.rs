//! Error types for probing operations

use thiserror::Error;

/// Everything that can make a probe fail
///
/// These never escape the prober: they are turned into the
/// `error_message` of a [`schema::ProbeResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The requested verb is not one of GET, POST, PUT or DELETE
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The target is not an absolute http(s) URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected target
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// DNS resolution or TCP connect failed
    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport gave up waiting
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other failure before a response arrived (TLS, protocol)
    #[error("request failed: {0}")]
    Transport(String),

    /// A response arrived with the wrong status
    #[error("expected status {expected}, got {observed}: {body}")]
    StatusMismatch {
        /// Status that would have passed
        expected: u16,
        /// Status the server returned
        observed: u16,
        /// Excerpt of the response body
        body: String,
    },

    /// Login did not yield a usable bearer token
    #[error("authentication failed: {0}")]
    Authentication(String),
}

impl ProbeError {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            ProbeError::UnsupportedMethod(_) => "PROBE001",
            ProbeError::InvalidUrl { .. } => "PROBE002",
            ProbeError::Connect(_) => "PROBE003",
            ProbeError::Timeout(_) => "PROBE004",
            ProbeError::Transport(_) => "PROBE005",
            ProbeError::StatusMismatch { .. } => "PROBE006",
            ProbeError::Authentication(_) => "PROBE007",
        }
    }

    /// No HTTP response was obtained
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProbeError::InvalidUrl { .. }
                | ProbeError::Connect(_)
                | ProbeError::Timeout(_)
                | ProbeError::Transport(_)
        )
    }
}

impl From<schema::MethodError> for ProbeError {
    fn from(err: schema::MethodError) -> Self {
        match err {
            schema::MethodError::UnsupportedMethod(m) => ProbeError::UnsupportedMethod(m),
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        // Display alone is just "error sending request"; include the sources.
        let detail = error_chain(&err);
        if err.is_timeout() {
            ProbeError::Timeout(detail)
        } else if err.is_connect() {
            ProbeError::Connect(detail)
        } else {
            ProbeError::Transport(detail)
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
