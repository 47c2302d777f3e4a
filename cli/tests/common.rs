#![allow(unused_crate_dependencies)]
//! Test utilities for CLI crate integration tests.
#![allow(missing_docs, dead_code)]

use async_trait::async_trait;
use routeprobe_core::{ProbeError, ProbeRequest, Transport, TransportResponse};
use std::future::Future;
use std::time::Duration;

/// Run the given future with a timeout, failing the test if it elapses.
///
/// # Panics
///
/// Panics if the timeout elapses before the future completes.
pub async fn run_with_timeout<F, T>(duration: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut)
        .await
        .expect("test timed out")
}

/// Backend double: health is up, every login is rejected, everything else 404s
pub struct RejectingBackend;

#[async_trait]
impl Transport for RejectingBackend {
    async fn send(&self, request: &ProbeRequest) -> Result<TransportResponse, ProbeError> {
        let path = request
            .url
            .split_once("://")
            .and_then(|(_, rest)| rest.find('/').map(|i| &rest[i..]))
            .unwrap_or("/");
        Ok(match path {
            "/api/health" => TransportResponse::new(200, r#"{"status":"ok"}"#),
            "/api/auth/login" => TransportResponse::new(401, r#"{"error":"invalid credentials"}"#),
            _ => TransportResponse::new(404, "not found"),
        })
    }
}
