//! In-process mock Confluence server shared by the integration tests.
//!
//! Every request is recorded; responses come from a table keyed by method
//! and path. Unknown routes answer 404.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use confluence_mcp::{ConfluenceClient, ConfluenceConfig, HttpSettings};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Bearer token configured on every test client.
pub const TOKEN: &str = "test-token";

/// A request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<HashMap<(String, String), Canned>>>,
}

/// Handle to a running mock server.
pub struct MockConfluence {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockConfluence {
    /// Binds an ephemeral port and starts serving.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(record).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    /// Base URL including the API root.
    pub fn base_url(&self) -> String {
        format!("http://{}/rest/api", self.addr)
    }

    /// Registers a canned response.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.insert(method, path, status, body.into(), None);
    }

    /// Registers a canned response served after `delay`.
    pub fn respond_after(
        &self,
        method: &str,
        path: &str,
        delay: Duration,
        status: u16,
        body: impl Into<String>,
    ) {
        self.insert(method, path, status, body.into(), Some(delay));
    }

    fn insert(&self, method: &str, path: &str, status: u16, body: String, delay: Option<Duration>) {
        self.state.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            Canned {
                status,
                body,
                delay,
            },
        );
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Returns the requests received with `method`.
    pub fn requests_with(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    /// Builds a client pointed at this server.
    pub fn client(&self) -> ConfluenceClient {
        client_for(&self.base_url())
    }
}

/// Builds a client for an arbitrary base URL with default timeouts.
pub fn client_for(base_url: &str) -> ConfluenceClient {
    let config = ConfluenceConfig::new(base_url, TOKEN).unwrap();
    ConfluenceClient::new(config, HttpSettings::default()).unwrap()
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record(State(state): State<MockState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let query: BTreeMap<String, String> = parts
        .uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();

    let method = parts.method.to_string();
    let path = parts.uri.path().to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query,
        authorization: header(&parts.headers, "authorization"),
        content_type: header(&parts.headers, "content-type"),
        accept: header(&parts.headers, "accept"),
        body: serde_json::from_slice(&bytes).ok(),
    });

    let canned = state
        .responses
        .lock()
        .unwrap()
        .get(&(method, path))
        .cloned()
        .unwrap_or(Canned {
            status: 404,
            body: "not found".to_string(),
            delay: None,
        });

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    (
        StatusCode::from_u16(canned.status).unwrap(),
        [(CONTENT_TYPE, "application/json")],
        canned.body,
    )
        .into_response()
}
