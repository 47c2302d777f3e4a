//! Console rendering of suite events

use schema::ProbeResult;

use crate::probe::ProbeError;
use crate::suite::{SuiteEvent, SuiteReport};

const PASS: &str = "✓";
const FAIL: &str = "✗";

/// One line for a probe result
pub fn render_result(result: &ProbeResult) -> String {
    match (result.succeeded, result.observed_status) {
        (true, Some(status)) => {
            format!("{} {} {} - Status: {}", PASS, result.method, result.url, status)
        }
        (false, Some(status)) => format!(
            "{} {} {} - Status: {} - Response: {}",
            FAIL,
            result.method,
            result.url,
            status,
            result.error_message.as_deref().unwrap_or_default()
        ),
        (_, None) => format!(
            "{} {} {} - Error: {}",
            FAIL,
            result.method,
            result.url,
            result.error_message.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Console text for any suite event (may span several lines)
pub fn render(event: &SuiteEvent) -> String {
    match event {
        SuiteEvent::Probe(result) => render_result(result),
        SuiteEvent::CredentialsMissing => {
            "No credentials provided. Skipping protected route tests.".to_string()
        }
        SuiteEvent::LoggedIn => format!("{} Logged in successfully, got token", PASS),
        SuiteEvent::LoginFailed(err) => {
            let detail = match err {
                ProbeError::Authentication(detail) => detail.clone(),
                other => other.to_string(),
            };
            format!(
                "{} Failed to login: {}\nCannot test protected routes without valid token",
                FAIL, detail
            )
        }
    }
}

/// Closing line for a finished run
pub fn summary(report: &SuiteReport) -> String {
    format!("{}/{} probes passed", report.passed(), report.total())
}
