//! Stub customer-care backend for end-to-end smoke runs
//!
//! [`StubBackend`] serves the health, login and protected endpoints over
//! real HTTP on a loopback port, counting every request it receives.

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use routeprobe_core::HttpTransport;
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Email the stub accepts
pub const VALID_EMAIL: &str = "agent@example.com";
/// Password the stub accepts
pub const VALID_PASSWORD: &str = "correct horse";
/// Token handed out on a successful login
pub const TOKEN: &str = "stub-token-42";

const PROTECTED: [&str; 7] = [
    "/api/auth/profile",
    "/api/tickets/",
    "/api/clients/",
    "/api/users/",
    "/api/sites/",
    "/api/routers/",
    "/api/analytics/dashboard",
];

/// In-process HTTP backend; shuts down when dropped
pub struct StubBackend {
    port: u16,
    requests: Arc<AtomicU32>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl StubBackend {
    /// Start a backend where every protected route answers 200
    pub async fn start() -> Self {
        Self::start_forbidding(&[]).await
    }

    /// Start a backend that answers 403 on the given protected paths
    pub async fn start_forbidding(forbidden: &[&str]) -> Self {
        let requests = Arc::new(AtomicU32::new(0));
        let forbidden: Arc<HashSet<String>> =
            Arc::new(forbidden.iter().map(|p| p.to_string()).collect());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let requests_clone = requests.clone();
        let make_svc = make_service_fn(move |_conn| {
            let requests = requests_clone.clone();
            let forbidden = forbidden.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    requests.fetch_add(1, Ordering::SeqCst);
                    handle(req, forbidden.clone())
                }))
            }
        });

        let addr = ([127, 0, 0, 1], 0).into();
        let server = Server::bind(&addr).serve(make_svc);
        let port = server.local_addr().port();
        let server = server.with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        });

        tokio::spawn(async move {
            if let Err(e) = server.await {
                eprintln!("Server error: {}", e);
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        Self {
            port,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL of the running backend
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    req: Request<Body>,
    forbidden: Arc<HashSet<String>>,
) -> Result<Response<Body>, Infallible> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    let response = match (method, path.as_str()) {
        (Method::GET, "/api/health") => json(StatusCode::OK, r#"{"status":"healthy"}"#),
        (Method::POST, "/api/auth/login") => {
            let bytes = hyper::body::to_bytes(req.into_body())
                .await
                .unwrap_or_default();
            login(&bytes)
        }
        (Method::GET, p) if PROTECTED.contains(&p) => {
            let authorized = header(&req, "authorization") == Some(format!("Bearer {}", TOKEN))
                && header(&req, "subject").is_some();
            if !authorized {
                json(StatusCode::UNAUTHORIZED, r#"{"detail":"Not authenticated"}"#)
            } else if forbidden.contains(p) {
                json(StatusCode::FORBIDDEN, r#"{"detail":"Forbidden"}"#)
            } else {
                json(StatusCode::OK, "[]")
            }
        }
        _ => json(StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#),
    };
    Ok(response)
}

fn login(body: &[u8]) -> Response<Body> {
    let creds: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
    let field = |name: &str| creds.get(name).and_then(|v| v.as_str()).unwrap_or_default();

    if field("email") == VALID_EMAIL && field("password") == VALID_PASSWORD {
        let body = serde_json::json!({"access_token": TOKEN, "token_type": "bearer"});
        json(StatusCode::OK, &body.to_string())
    } else {
        json(StatusCode::UNAUTHORIZED, r#"{"error":"invalid credentials"}"#)
    }
}

fn header(req: &Request<Body>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn json(status: StatusCode, body: &str) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

/// HTTP transport that bypasses any proxy configured in the environment
pub fn loopback_transport() -> HttpTransport {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("reqwest client");
    HttpTransport::with_client(client)
}

/// A loopback port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}
