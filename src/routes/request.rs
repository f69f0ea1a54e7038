//! Request and response shapes.
//!
//! Handlers are plain functions over these records; nothing here is bound
//! to a socket.

use rustc_hash::FxHashMap;
use serde_json::{Value, json};

use crate::utils::hashing::request_id;

/// Methods the router dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The uppercase method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Path parameters captured from `{name}` pattern segments.
pub type PathParams = FxHashMap<String, String>;

/// A request-shaped value with a generated trace id.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: FxHashMap<String, String>,
    pub query: FxHashMap<String, String>,
    pub body: Option<Value>,
    pub request_id: String,
}

impl Request {
    /// Build a request with a fresh trace id.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: FxHashMap::default(),
            query: FxHashMap::default(),
            body: None,
            request_id: request_id(),
        }
    }

    /// Shorthand for a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Attach a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());

        self
    }

    /// Attach a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());

        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);

        self
    }

    /// Read a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// A response-shaped value: a status code plus a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
    pub headers: FxHashMap<String, String>,
}

impl Response {
    /// Build a response from parts.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            headers: FxHashMap::default(),
        }
    }

    /// 200 with the given body.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// 201 with the given body.
    #[must_use]
    pub fn created(body: Value) -> Self {
        Self::new(201, body)
    }

    /// 400 with an error message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, json!({ "error": message.into() }))
    }

    /// 401 with an error message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, json!({ "error": message.into() }))
    }

    /// 403 with an error message.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, json!({ "error": message.into() }))
    }

    /// 404 with an error message.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, json!({ "error": message.into() }))
    }

    /// 409 with an error message.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, json!({ "error": message.into() }))
    }

    /// 429 with the given body.
    #[must_use]
    pub fn too_many_requests(body: Value) -> Self {
        Self::new(429, body)
    }

    /// 500 with a generic message.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(500, json!({ "error": "Internal server error" }))
    }

    /// Pretty-print the body for logs and demos.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.to_string())
    }
}
