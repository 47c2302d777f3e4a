//! Route plan types for a smoke run
//!
//! A [`SmokeConfig`] names the backend under test, the login identity used
//! to obtain a bearer token and the protected routes to probe with it.
//! Every field except `base_url` has a default matching the customer-care
//! backend layout, so a minimal TOML file only needs:
//!
//! ```toml
//! baseUrl = "https://backend.example.com"
//!
//! [credentials]
//! email = "agent@example.com"
//! password = "secret"
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Login identity
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Account email
    #[serde(default, deserialize_with = "trimmed")]
    pub email: String,
    /// Account password
    #[serde(default, deserialize_with = "trimmed")]
    pub password: String,
}

impl Credentials {
    /// Create credentials, trimming surrounding whitespace
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into().trim().to_string(),
        }
    }

    /// Both email and password are non-blank
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.trim().is_empty()
    }

    /// JSON body expected by the login endpoint
    pub fn login_body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password,
        })
    }
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

// Keep passwords out of debug output and logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One protected route to probe after logging in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCheck {
    /// Path appended to the base URL, starting with `/`
    pub path: String,
    /// Verb as written in the plan; unknown verbs are reported as failed probes
    #[serde(default = "default_method")]
    pub method: String,
    /// Status code that counts as a pass
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    /// Optional JSON payload (POST/PUT only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Extra headers for this route only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Attach the bearer token and subject headers
    #[serde(default = "default_true")]
    pub authenticated: bool,
}

impl RouteCheck {
    /// An authenticated `GET` expecting 200
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: default_method(),
            expected_status: default_expected_status(),
            body: None,
            headers: BTreeMap::new(),
            authenticated: true,
        }
    }
}

/// Top-level route plan for a smoke run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeConfig {
    /// Backend base URL, e.g. `https://backend.example.com`
    #[serde(default)]
    pub base_url: String,
    /// Unauthenticated health endpoint
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Login endpoint accepting `{email, password}`
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Value of the `subject` header sent with protected requests
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Credentials the backend is expected to reject
    #[serde(default = "default_invalid_login")]
    pub invalid_login: Credentials,
    /// Status expected for the rejected login
    #[serde(default = "default_invalid_login_status")]
    pub invalid_login_status: u16,
    /// Real login identity; protected routes are skipped without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Protected routes probed with the bearer token
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteCheck>,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            health_path: default_health_path(),
            login_path: default_login_path(),
            subject: default_subject(),
            invalid_login: default_invalid_login(),
            invalid_login_status: default_invalid_login_status(),
            credentials: None,
            routes: default_routes(),
        }
    }
}

impl SmokeConfig {
    /// Join the base URL and a path without doubling the slash
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Credentials, only if both fields are filled in
    pub fn usable_credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref().filter(|c| c.is_complete())
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_expected_status() -> u16 {
    200
}

fn default_true() -> bool {
    true
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

fn default_login_path() -> String {
    "/api/auth/login".to_string()
}

fn default_subject() -> String {
    "default".to_string()
}

fn default_invalid_login() -> Credentials {
    Credentials::new("test@example.com", "password")
}

fn default_invalid_login_status() -> u16 {
    401
}

/// Protected routes of the customer-care backend
pub fn default_routes() -> Vec<RouteCheck> {
    [
        "/api/auth/profile",
        "/api/tickets/",
        "/api/clients/",
        "/api/users/",
        "/api/sites/",
        "/api/routers/",
        "/api/analytics/dashboard",
    ]
    .into_iter()
    .map(RouteCheck::get)
    .collect()
}
