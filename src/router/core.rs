use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Inbound request as seen by a mounted handler.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    /// Request path without the query string
    pub path: &'a str,
    /// HTTP headers (names as received)
    pub headers: &'a [(String, String)],
    /// Raw request body
    pub body: &'a [u8],
}

impl<'a> RouteRequest<'a> {
    #[must_use]
    pub fn new(path: &'a str, headers: &'a [(String, String)], body: &'a [u8]) -> Self {
        Self {
            path,
            headers,
            body,
        }
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by a mounted handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 400, 500, ...)
    pub status: u16,
    /// Extra response headers; `Content-Type: application/json` is implied
    #[serde(skip_serializing)]
    pub headers: Vec<(String, String)>,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a JSON response with no extra headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Create an error response with a `{"message": ...}` body
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "message": message }))
    }

    /// The `message` of an error body, if there is one
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Get a header by name
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }
}

/// A per-route request callback.
pub type RouteHandler = Arc<dyn Fn(RouteRequest<'_>) -> HandlerResponse + Send + Sync>;

/// The routing substrate the registry mounts handlers on.
pub trait Router {
    /// Mount `handler` for POST requests to `path`.
    fn post(&mut self, path: &str, handler: RouteHandler);
}

/// In-process router: a path → handler table dispatched by exact match.
#[derive(Clone, Default)]
pub struct MemoryRouter {
    routes: IndexMap<String, RouteHandler>,
}

impl MemoryRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler mounted at `path`, if any
    #[must_use]
    pub fn handler(&self, path: &str) -> Option<&RouteHandler> {
        self.routes.get(path)
    }

    /// Mounted paths in mount order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch a POST body to the handler at `path`.
    ///
    /// Returns `None` when nothing is mounted there.
    #[must_use]
    pub fn dispatch(&self, path: &str, body: &[u8]) -> Option<HandlerResponse> {
        self.dispatch_request(RouteRequest::new(path, &[], body))
    }

    /// Dispatch a full request (headers included).
    #[must_use]
    pub fn dispatch_request(&self, request: RouteRequest<'_>) -> Option<HandlerResponse> {
        let handler = self.routes.get(request.path)?;
        Some(handler(request))
    }
}

impl Router for MemoryRouter {
    fn post(&mut self, path: &str, handler: RouteHandler) {
        if self.routes.insert(path.to_string(), handler).is_some() {
            warn!(path, "replaced an existing route");
        } else {
            debug!(path, total_routes = self.routes.len(), "route mounted");
        }
    }
}

impl std::fmt::Debug for MemoryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRouter")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}
