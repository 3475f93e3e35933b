//! Normalised API failures.

use serde_json::Value;

use crate::domain::Error;
use crate::domain::cache::CacheError;
use crate::domain::ports::{ApiTransportError, KeyValueStoreError};

/// What went wrong, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The server answered with a non-2xx status.
    Http,
    /// The request never reached the server.
    Network,
    /// The request ran out of time.
    Timeout,
    /// The connectivity check reported no connection.
    Offline,
    /// The session could not be refreshed; the user must sign in again.
    SessionExpired,
    /// Reading or writing the session failed.
    Storage,
    /// A successful response did not have the expected shape.
    Decode,
    /// The request could not be built from the caller's input.
    InvalidRequest,
}

/// Every failure the API client reports.
///
/// `message` prefers the server's JSON `message` field; `code` is the
/// server's JSON `code` field when present.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    status: Option<u16>,
    code: Option<String>,
    data: Option<Value>,
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "api request failed".to_owned()
        } else {
            message
        };
        Self {
            kind,
            message,
            status: None,
            code: None,
            data: None,
        }
    }

    /// Normalise a non-2xx response.
    #[must_use]
    pub fn from_response(status: u16, body: Value) -> Self {
        let message = non_blank(body.get("message").and_then(Value::as_str))
            .or_else(|| non_blank(body.as_str()))
            .unwrap_or_else(|| format!("request failed with status code {status}"));
        let code = non_blank(body.get("code").and_then(Value::as_str));
        Self {
            status: Some(status),
            code,
            data: (!body.is_null()).then_some(body),
            ..Self::new(ApiErrorKind::Http, message)
        }
    }

    /// No connection according to the connectivity check.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(ApiErrorKind::Offline, "no internet connection")
    }

    /// The session has no refresh token to exchange.
    #[must_use]
    pub fn missing_refresh_token() -> Self {
        Self::new(ApiErrorKind::SessionExpired, "no refresh token available")
    }

    /// A successful body that failed to decode.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    /// Reclassify a refresh failure as an expired session, keeping status,
    /// code and body.
    #[must_use]
    pub fn into_session_expired(self) -> Self {
        Self {
            kind: ApiErrorKind::SessionExpired,
            ..self
        }
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Server-supplied error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Response body of a failed request.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Returns `true` when no response was received.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network | ApiErrorKind::Offline)
    }

    /// Returns `true` when the request timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Timeout)
    }

    /// Whether another attempt could succeed.
    ///
    /// Client errors other than 401 will fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ApiErrorKind::Http => match self.status {
                Some(401) => true,
                Some(status) => !(400..500).contains(&status),
                None => true,
            },
            ApiErrorKind::Network | ApiErrorKind::Timeout => true,
            ApiErrorKind::Offline
            | ApiErrorKind::SessionExpired
            | ApiErrorKind::Storage
            | ApiErrorKind::Decode
            | ApiErrorKind::InvalidRequest => false,
        }
    }
}

impl From<ApiTransportError> for ApiError {
    fn from(value: ApiTransportError) -> Self {
        match value {
            ApiTransportError::Network { message } => Self::new(ApiErrorKind::Network, message),
            ApiTransportError::Timeout { message } => Self::new(ApiErrorKind::Timeout, message),
            ApiTransportError::InvalidRequest { message } => {
                Self::new(ApiErrorKind::InvalidRequest, message)
            }
        }
    }
}

impl From<KeyValueStoreError> for ApiError {
    fn from(value: KeyValueStoreError) -> Self {
        Self::new(ApiErrorKind::Storage, value.to_string())
    }
}

impl From<CacheError> for ApiError {
    fn from(value: CacheError) -> Self {
        Self::new(ApiErrorKind::Storage, value.to_string())
    }
}

impl From<ApiError> for Error {
    fn from(value: ApiError) -> Self {
        let mapped = match (value.kind, value.status) {
            (ApiErrorKind::Network | ApiErrorKind::Timeout | ApiErrorKind::Offline, _) => {
                Self::service_unavailable(value.message)
            }
            (ApiErrorKind::SessionExpired, _) | (ApiErrorKind::Http, Some(401)) => {
                Self::unauthorized(value.message)
            }
            (ApiErrorKind::InvalidRequest, _) => Self::invalid_request(value.message),
            (ApiErrorKind::Http, Some(403)) => Self::forbidden(value.message),
            (ApiErrorKind::Http, Some(404)) => Self::not_found(value.message),
            (ApiErrorKind::Http, Some(409)) => Self::conflict(value.message),
            (ApiErrorKind::Http, Some(status)) if (400..500).contains(&status) => {
                Self::invalid_request(value.message)
            }
            _ => Self::internal(value.message),
        };
        match value.data {
            Some(data) => mapped.with_details(data),
            None => mapped,
        }
    }
}
