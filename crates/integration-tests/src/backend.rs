//! Minimal HTTP backend for exercising the real client.
//!
//! An axum router with a single fallback handler serves canned JSON
//! responses keyed by `METHOD path` and records every request.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;

/// A request the backend received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    body: String,
}

struct BackendState {
    routes: HashMap<String, CannedResponse>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Running stub backend.
pub struct StubBackend {
    origin: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubBackend {
    /// Start building a backend.
    #[must_use]
    pub fn builder() -> StubBackendBuilder {
        StubBackendBuilder::default()
    }

    /// `http://127.0.0.1:<port>`
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received for `path`.
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.path == path)
            .count()
    }
}

/// Collects canned responses before the backend starts listening.
#[derive(Default)]
pub struct StubBackendBuilder {
    routes: HashMap<String, CannedResponse>,
}

impl StubBackendBuilder {
    /// Answer `method path` with `status` and a JSON `body`.
    #[must_use]
    pub fn route(self, method: &str, path: &str, status: u16, body: &Value) -> Self {
        self.raw_route(method, path, status, &body.to_string())
    }

    /// Answer `method path` with `status` and a raw body.
    #[must_use]
    pub fn raw_route(mut self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            format!("{method} {path}"),
            CannedResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Bind to a free local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(self) -> io::Result<StubBackend> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let origin = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = Arc::new(BackendState {
            routes: self.routes,
            requests: Arc::clone(&requests),
        });
        let app = Router::new().fallback(respond).with_state(state);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "stub backend stopped");
            }
        });

        Ok(StubBackend { origin, requests })
    }
}

async fn respond(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let canned = state.routes.get(&format!("{method} {path}")).cloned();

    state.requests.lock().push(RecordedRequest {
        method: method.to_string(),
        path,
        body: serde_json::from_slice(&body).ok(),
    });

    let CannedResponse { status, body } = canned.unwrap_or_else(|| CannedResponse {
        status: 404,
        body: r#"{"error":"NotFound"}"#.to_string(),
    });
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
