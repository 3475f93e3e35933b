//! Port for sending HTTP requests to the FindMyJob API.
//!
//! The transport only moves bytes: it reports any HTTP status, including
//! errors, as a [`TransportResponse`]. Retry, caching and token refresh live
//! in [`crate::domain::ApiClient`].

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

/// HTTP methods the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Method.
    pub method: HttpMethod,
    /// Path such as `/jobs/123`.
    pub path: String,
    /// Query parameters; a JSON object whose scalar members become pairs.
    pub query: Option<Value>,
    /// JSON body.
    pub body: Option<Value>,
    /// Bearer token for the `Authorization` header.
    pub bearer_token: Option<String>,
}

impl TransportRequest {
    /// Request with no query, body or token.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            bearer_token: None,
        }
    }
}

/// Response status and decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body; `Null` when empty, a JSON string when not JSON.
    pub body: Value,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

define_port_error! {
    /// Failures before any HTTP status was received.
    pub enum ApiTransportError {
        /// Connection, DNS or TLS failure.
        Network { message: String } => "network request failed: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } => "request timed out: {message}",
        /// The request could not be built; sending it again cannot help.
        InvalidRequest { message: String } => "invalid request: {message}",
    }
}

/// Sends requests to the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Send `request` and return whatever status the server answered with.
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, ApiTransportError>;
}
