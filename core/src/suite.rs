//! Smoke suite: the fixed probe sequence against one backend
//!
//! The run goes health check, rejected login, real login, then every
//! protected route with the bearer token. Steps run strictly one after
//! another and each probe result is handed to the caller as soon as it is
//! known. A failing step never aborts the run; a failed or skipped login
//! only skips the protected routes.

use schema::{Credentials, ProbeRequest, ProbeResult, RouteCheck, SmokeConfig};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::probe::{body_excerpt, ProbeError, RouteProber, Transport};

/// Progress notifications emitted while the suite runs
#[derive(Debug, Clone, PartialEq)]
pub enum SuiteEvent {
    /// A probe finished
    Probe(ProbeResult),
    /// No usable credentials were configured; protected routes are skipped
    CredentialsMissing,
    /// Login succeeded and a bearer token was obtained
    LoggedIn,
    /// Login did not yield a token; protected routes are skipped
    LoginFailed(ProbeError),
}

/// Everything a run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteReport {
    /// Probe results in the order they were issued
    pub results: Vec<ProbeResult>,
    /// Whether a bearer token was obtained
    pub authenticated: bool,
}

impl SuiteReport {
    /// Number of probes that passed
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    /// Number of probes that failed
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Number of probes issued
    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Runs the probe sequence described by a [`SmokeConfig`]
pub struct SmokeSuite<T> {
    config: SmokeConfig,
    prober: RouteProber<T>,
}

impl<T> SmokeSuite<T>
where
    T: Transport + Send + Sync,
{
    /// Create a suite for the given route plan
    pub fn new(config: SmokeConfig, prober: RouteProber<T>) -> Self {
        Self { config, prober }
    }

    /// The route plan this suite runs
    pub fn config(&self) -> &SmokeConfig {
        &self.config
    }

    /// The prober used for every request
    pub fn prober(&self) -> &RouteProber<T> {
        &self.prober
    }

    /// Run every step, calling `on_event` as results come in
    pub async fn run<F>(&self, mut on_event: F) -> SuiteReport
    where
        F: FnMut(&SuiteEvent),
    {
        let cfg = &self.config;
        let mut report = SuiteReport::default();
        info!(base_url = %cfg.base_url, routes = cfg.routes.len(), "starting smoke run");

        let health = ProbeRequest::get(cfg.url_for(&cfg.health_path));
        let result = self.prober.probe(&health).await;
        record(&mut report, &mut on_event, result);

        let rejected = ProbeRequest::post(cfg.url_for(&cfg.login_path))
            .json(cfg.invalid_login.login_body())
            .expect_status(cfg.invalid_login_status);
        let result = self.prober.probe(&rejected).await;
        record(&mut report, &mut on_event, result);

        let Some(credentials) = cfg.usable_credentials() else {
            info!("no credentials configured, skipping protected routes");
            on_event(&SuiteEvent::CredentialsMissing);
            return report;
        };

        let token = match self.login(credentials).await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "login failed, skipping protected routes");
                on_event(&SuiteEvent::LoginFailed(err));
                return report;
            }
        };
        report.authenticated = true;
        on_event(&SuiteEvent::LoggedIn);

        for route in &cfg.routes {
            let headers = self.route_headers(route, &token);
            let result = self
                .prober
                .probe_route(
                    &route.method,
                    &cfg.url_for(&route.path),
                    &headers,
                    route.body.as_ref(),
                    route.expected_status,
                )
                .await;
            record(&mut report, &mut on_event, result);
        }

        info!(
            passed = report.passed(),
            total = report.total(),
            "smoke run finished"
        );
        report
    }

    /// Log in and return the bearer token from the response
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ProbeError> {
        let request = ProbeRequest::post(self.config.url_for(&self.config.login_path))
            .json(credentials.login_body());

        let response = self
            .prober
            .exchange(&request)
            .await
            .map_err(|e| ProbeError::Authentication(e.to_string()))?;

        if response.status != 200 {
            return Err(ProbeError::Authentication(format!(
                "{} - {}",
                response.status,
                body_excerpt(&response.body)
            )));
        }
        extract_access_token(&response.body)
    }

    fn route_headers(&self, route: &RouteCheck, token: &str) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if route.authenticated {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
            headers.insert("subject".to_string(), self.config.subject.clone());
        }
        for (name, value) in &route.headers {
            // Header names compare case-insensitively on the wire.
            headers.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

fn record<F>(report: &mut SuiteReport, on_event: &mut F, result: ProbeResult)
where
    F: FnMut(&SuiteEvent),
{
    report.results.push(result.clone());
    on_event(&SuiteEvent::Probe(result));
}

/// Pull a non-empty string `access_token` out of a login response body
pub fn extract_access_token(body: &str) -> Result<String, ProbeError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        ProbeError::Authentication(format!("login response is not JSON: {}", e))
    })?;

    match value.get("access_token").and_then(serde_json::Value::as_str) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(ProbeError::Authentication(
            "login response has no access_token".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::TransportResponse;
    use async_trait::async_trait;
    use schema::HttpMethod;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://example.test";

    /// Answers by (method, url); anything unscripted gets a 404
    #[derive(Default)]
    struct ScriptedTransport {
        routes: HashMap<(HttpMethod, String), Result<TransportResponse, ProbeError>>,
        seen: Mutex<Vec<ProbeRequest>>,
    }

    impl ScriptedTransport {
        fn on(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
            self.routes.insert(
                (method, format!("{}{}", BASE, path)),
                Ok(TransportResponse::new(status, body)),
            );
            self
        }

        fn failing(mut self, method: HttpMethod, path: &str, err: ProbeError) -> Self {
            self.routes.insert((method, format!("{}{}", BASE, path)), Err(err));
            self
        }

        fn seen(&self) -> Vec<ProbeRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &ProbeRequest) -> Result<TransportResponse, ProbeError> {
            self.seen.lock().unwrap().push(request.clone());
            self.routes
                .get(&(request.method, request.url.clone()))
                .cloned()
                .unwrap_or_else(|| Ok(TransportResponse::new(404, "not found")))
        }
    }

    /// Login rejects the default test identity and accepts `agent@example.com`
    struct LoginAwareTransport {
        inner: ScriptedTransport,
        token_body: String,
    }

    #[async_trait]
    impl Transport for LoginAwareTransport {
        async fn send(&self, request: &ProbeRequest) -> Result<TransportResponse, ProbeError> {
            if request.url.ends_with("/api/auth/login") {
                self.inner.seen.lock().unwrap().push(request.clone());
                let email = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("email"))
                    .and_then(|e| e.as_str())
                    .unwrap_or_default();
                return Ok(if email == "agent@example.com" {
                    TransportResponse::new(200, self.token_body.clone())
                } else {
                    TransportResponse::new(401, r#"{"error":"invalid credentials"}"#)
                });
            }
            self.inner.send(request).await
        }
    }

    fn config(credentials: Option<Credentials>) -> SmokeConfig {
        SmokeConfig {
            base_url: BASE.to_string(),
            credentials,
            ..Default::default()
        }
    }

    fn healthy_backend() -> ScriptedTransport {
        let mut transport = ScriptedTransport::default()
            .on(HttpMethod::Get, "/api/health", 200, "")
            .on(HttpMethod::Post, "/api/auth/login", 401, r#"{"error":"invalid credentials"}"#);
        for route in schema::default_routes() {
            transport = transport.on(HttpMethod::Get, &route.path, 200, "[]");
        }
        transport
    }

    async fn run_collecting<T: Transport + Send + Sync>(
        suite: &SmokeSuite<T>,
    ) -> (SuiteReport, Vec<SuiteEvent>) {
        let mut events = Vec::new();
        let report = suite.run(|e| events.push(e.clone())).await;
        (report, events)
    }

    #[tokio::test]
    async fn test_without_credentials_only_public_probes_run() {
        let suite = SmokeSuite::new(config(None), RouteProber::new(healthy_backend()));
        let (report, events) = run_collecting(&suite).await;

        assert_eq!(report.total(), 2);
        assert_eq!(report.passed(), 2);
        assert!(!report.authenticated);
        assert_eq!(events.last(), Some(&SuiteEvent::CredentialsMissing));

        let seen = suite.prober().transport().seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].url, "https://example.test/api/health");
        assert_eq!(seen[1].method, HttpMethod::Post);
        assert_eq!(
            seen[1].body,
            Some(json!({"email": "test@example.com", "password": "password"}))
        );
    }

    #[tokio::test]
    async fn test_blank_credentials_count_as_missing() {
        let suite = SmokeSuite::new(
            config(Some(Credentials::new("", ""))),
            RouteProber::new(healthy_backend()),
        );
        let (_, events) = run_collecting(&suite).await;
        assert_eq!(events.last(), Some(&SuiteEvent::CredentialsMissing));
    }

    #[tokio::test]
    async fn test_failed_login_skips_protected_routes() {
        let suite = SmokeSuite::new(
            config(Some(Credentials::new("agent@example.com", "wrong"))),
            RouteProber::new(healthy_backend()),
        );
        let (report, events) = run_collecting(&suite).await;

        assert_eq!(report.total(), 2);
        assert!(!report.authenticated);
        match events.last() {
            Some(SuiteEvent::LoginFailed(ProbeError::Authentication(detail))) => {
                assert!(detail.starts_with("401 - "), "detail was {}", detail);
                assert!(detail.contains("invalid credentials"));
            }
            other => panic!("expected LoginFailed, got {:?}", other),
        }
        // health, rejected login, real login; nothing protected
        assert_eq!(suite.prober().transport().seen().len(), 3);
    }

    #[tokio::test]
    async fn test_login_transport_error_is_authentication_failure() {
        let transport = healthy_backend().failing(
            HttpMethod::Post,
            "/api/auth/login",
            ProbeError::Connect("connection refused".to_string()),
        );
        let suite = SmokeSuite::new(
            config(Some(Credentials::new("agent@example.com", "pw"))),
            RouteProber::new(transport),
        );
        let (report, events) = run_collecting(&suite).await;

        // the rejected-login probe also hit the refused connection
        assert_eq!(report.passed(), 1);
        assert!(report.results[1].observed_status.is_none());
        assert!(matches!(
            events.last(),
            Some(SuiteEvent::LoginFailed(ProbeError::Authentication(d))) if d.contains("connection refused")
        ));
    }

    #[tokio::test]
    async fn test_successful_login_threads_token_to_protected_routes() {
        let transport = LoginAwareTransport {
            inner: healthy_backend(),
            token_body: r#"{"access_token":"tok-123","token_type":"bearer"}"#.to_string(),
        };
        let suite = SmokeSuite::new(
            config(Some(Credentials::new("agent@example.com", "secret"))),
            RouteProber::new(transport),
        );
        let (report, events) = run_collecting(&suite).await;

        assert!(report.authenticated);
        assert_eq!(report.total(), 2 + 7);
        assert_eq!(report.failed(), 0);
        assert!(events.contains(&SuiteEvent::LoggedIn));

        let seen = suite.prober().transport().inner.seen();
        let protected: Vec<_> = seen.iter().skip(3).collect();
        assert_eq!(protected.len(), 7);
        for req in protected {
            assert_eq!(
                req.headers.get("Authorization").map(String::as_str),
                Some("Bearer tok-123")
            );
            assert_eq!(req.headers.get("subject").map(String::as_str), Some("default"));
        }
    }

    #[tokio::test]
    async fn test_protected_route_failures_do_not_stop_the_run() {
        let inner = healthy_backend()
            .on(HttpMethod::Get, "/api/tickets/", 403, r#"{"detail":"forbidden"}"#)
            .failing(
                HttpMethod::Get,
                "/api/users/",
                ProbeError::Timeout("operation timed out".to_string()),
            );
        let mut cfg = config(Some(Credentials::new("agent@example.com", "secret")));
        cfg.routes.push(RouteCheck {
            method: "PATCH".to_string(),
            ..RouteCheck::get("/api/tickets/1")
        });
        let suite = SmokeSuite::new(
            cfg,
            RouteProber::new(LoginAwareTransport {
                inner,
                token_body: r#"{"access_token":"abc"}"#.to_string(),
            }),
        );
        let (report, _) = run_collecting(&suite).await;

        assert_eq!(report.total(), 2 + 8);
        assert_eq!(report.failed(), 3);

        let tickets = report
            .results
            .iter()
            .find(|r| r.url.ends_with("/api/tickets/"))
            .unwrap();
        assert_eq!(tickets.observed_status, Some(403));
        assert!(tickets.error_message.as_deref().unwrap().contains("403"));

        let patch = report.results.last().unwrap();
        assert_eq!(patch.method, "PATCH");
        assert!(patch.observed_status.is_none());

        // PATCH never went out: health, rejected login, login, 7 GETs
        assert_eq!(suite.prober().transport().inner.seen().len(), 10);
    }

    #[tokio::test]
    async fn test_unauthenticated_route_gets_no_bearer() {
        let mut cfg = config(Some(Credentials::new("agent@example.com", "secret")));
        let mut public = RouteCheck::get("/api/health");
        public.authenticated = false;
        public.headers.insert("x-trace".to_string(), "smoke".to_string());
        cfg.routes = vec![public];

        let suite = SmokeSuite::new(
            cfg,
            RouteProber::new(LoginAwareTransport {
                inner: healthy_backend(),
                token_body: r#"{"access_token":"abc"}"#.to_string(),
            }),
        );
        run_collecting(&suite).await;

        let seen = suite.prober().transport().inner.seen();
        let last = seen.last().unwrap();
        assert!(!last.headers.contains_key("Authorization"));
        assert_eq!(last.headers.get("x-trace").map(String::as_str), Some("smoke"));
    }

    #[tokio::test]
    async fn test_route_headers_override_builtins_ignoring_case() {
        let mut cfg = config(Some(Credentials::new("agent@example.com", "secret")));
        let mut lower = RouteCheck::get("/api/tickets/");
        lower
            .headers
            .insert("authorization".to_string(), "Bearer override".to_string());
        let mut upper = RouteCheck::get("/api/users/");
        upper.headers.insert("SUBJECT".to_string(), "acme".to_string());
        cfg.routes = vec![lower, upper];

        let suite = SmokeSuite::new(
            cfg,
            RouteProber::new(LoginAwareTransport {
                inner: healthy_backend(),
                token_body: r#"{"access_token":"tok"}"#.to_string(),
            }),
        );
        run_collecting(&suite).await;

        let seen = suite.prober().transport().inner.seen();
        let tickets = &seen[seen.len() - 2];
        assert_eq!(tickets.headers.len(), 2);
        assert_eq!(
            tickets.headers.get("authorization").map(String::as_str),
            Some("Bearer override")
        );
        assert!(!tickets.headers.contains_key("Authorization"));

        let users = &seen[seen.len() - 1];
        assert_eq!(users.headers.len(), 2);
        assert_eq!(users.headers.get("SUBJECT").map(String::as_str), Some("acme"));
        assert_eq!(
            users.headers.get("Authorization").map(String::as_str),
            Some("Bearer tok")
        );
    }

    #[test]
    fn test_extract_access_token() {
        assert_eq!(
            extract_access_token(r#"{"access_token":"abc","token_type":"bearer"}"#).unwrap(),
            "abc"
        );
        assert!(extract_access_token(r#"{"token":"abc"}"#).is_err());
        assert!(extract_access_token(r#"{"access_token":""}"#).is_err());
        assert!(extract_access_token(r#"{"access_token":42}"#).is_err());
        assert!(matches!(
            extract_access_token("<html>"),
            Err(ProbeError::Authentication(m)) if m.contains("not JSON")
        ));
    }

    #[test]
    fn test_report_counts() {
        let report = SuiteReport {
            results: vec![
                ProbeResult::passed("GET", "u", 200),
                ProbeResult::failed("GET", "u", "down"),
                ProbeResult::failed_with_status("GET", "u", 500, "boom"),
            ],
            authenticated: false,
        };
        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
    }
}
