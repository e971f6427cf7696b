//! HTTP-like routes served over the bridge.
//!
//! Route handlers are written against a small web-framework surface: they
//! receive a [`RouteRequest`] and write into a [`MockResponse`]. The bridge
//! creates both for a single `route.handle` call and serialises whatever the
//! handler left in the response.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capability::PluginContext;
use crate::error::CapabilityError;

/// HTTP method a route is declared for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// Static file serving.
    Static,
}

impl RouteMethod {
    /// Returns the wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Static => "STATIC",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request object handed to a route handler.
///
/// Missing fields default to empty values; `method` and `path` default to the
/// route's own declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteRequest {
    /// Request body.
    pub body: Value,
    /// Path parameters.
    pub params: Map<String, Value>,
    /// Query string parameters.
    pub query: Map<String, Value>,
    /// Request headers.
    pub headers: Map<String, Value>,
    /// HTTP method, if the host supplied one.
    pub method: Option<String>,
    /// Request path, if the host supplied one.
    pub path: Option<String>,
}

impl RouteRequest {
    /// Fills `method` and `path` from the route when the host omitted them.
    #[must_use]
    pub fn fill_defaults(mut self, method: RouteMethod, path: &str) -> Self {
        if self.method.is_none() {
            self.method = Some(method.as_str().to_owned());
        }
        if self.path.is_none() {
            self.path = Some(path.to_owned());
        }
        self
    }
}

/// Response accumulator a route handler writes into.
///
/// # Example
///
/// ```
/// use bridge_plugins::MockResponse;
/// use serde_json::json;
///
/// let mut response = MockResponse::new();
/// response.status(201).set_header("x-trace", "abc").json(json!({"ok": true}));
/// assert_eq!(response.status_code(), 201);
/// assert_eq!(response.body(), &json!({"ok": true}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockResponse {
    status: u16,
    body: Value,
    headers: BTreeMap<String, String>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResponse {
    /// Creates a `200` response with a `null` body and no headers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: 200,
            body: Value::Null,
            headers: BTreeMap::new(),
        }
    }

    /// Sets the status code.
    pub const fn status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets a JSON body.
    pub fn json(&mut self, body: Value) -> &mut Self {
        self.body = body;
        self
    }

    /// Sets a body from any JSON-convertible value.
    pub fn send(&mut self, body: impl Into<Value>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Sets a response header, replacing any previous value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Handles requests for a route.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// Processes `request`, writing the outcome into `response`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] when the handler fails; the bridge reports
    /// this as a `500` response.
    async fn handle(
        &self,
        context: &PluginContext,
        request: &RouteRequest,
        response: &mut MockResponse,
    ) -> Result<(), CapabilityError>;
}

/// Adapts a synchronous closure into a [`RouteHandler`].
pub struct SyncRouteHandler<F>(F);

#[async_trait]
impl<F> RouteHandler for SyncRouteHandler<F>
where
    F: Fn(&RouteRequest, &mut MockResponse) -> Result<(), CapabilityError> + Send + Sync,
{
    async fn handle(
        &self,
        _context: &PluginContext,
        request: &RouteRequest,
        response: &mut MockResponse,
    ) -> Result<(), CapabilityError> {
        (self.0)(request, response)
    }
}

/// A declared route and its optional handler.
#[derive(Clone)]
pub struct Route {
    path: String,
    method: RouteMethod,
    name: Option<String>,
    public: bool,
    handler: Option<Arc<dyn RouteHandler>>,
}

impl Route {
    /// Declares a route without a handler.
    #[must_use]
    pub fn new(method: RouteMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            name: None,
            public: false,
            handler: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks the route as publicly reachable.
    #[must_use]
    pub const fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Attaches an asynchronous handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn RouteHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Attaches a synchronous closure as the handler.
    #[must_use]
    pub fn with_sync_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&RouteRequest, &mut MockResponse) -> Result<(), CapabilityError>
            + Send
            + Sync
            + 'static,
    {
        self.with_handler(Arc::new(SyncRouteHandler(handler)))
    }

    /// Route path, the lookup key.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared HTTP method.
    #[must_use]
    pub const fn method(&self) -> RouteMethod {
        self.method
    }

    /// Optional display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the route is publicly reachable.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    /// The handler, when one was attached.
    #[must_use]
    pub fn handler(&self) -> Option<&Arc<dyn RouteHandler>> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("name", &self.name)
            .field("public", &self.public)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
