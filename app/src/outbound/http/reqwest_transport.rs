//! Reqwest-backed API transport.
//!
//! This adapter owns transport details only: URL construction, query
//! encoding, bearer auth, timeouts, and turning response bytes into JSON.
//! Status handling belongs to the API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::domain::ports::{
    ApiTransport, ApiTransportError, HttpMethod, TransportRequest, TransportResponse,
};

const DEFAULT_USER_AGENT: &str = concat!("findmyjob-client/", env!("CARGO_PKG_VERSION"));

/// Transport that sends requests relative to one base URL.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL every request path is appended to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, ApiTransportError> {
        let url = build_url(&self.base_url, &request.path, request.query.as_ref())?;
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        Ok(TransportResponse {
            status,
            body: decode_body(&bytes),
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Append `path` to `base` and encode `query` as URL parameters.
///
/// `query` must be a JSON object; `null` members are skipped and array
/// members repeat the key once per element.
fn build_url(base: &Url, path: &str, query: Option<&Value>) -> Result<Url, ApiTransportError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)
        .map_err(|error| ApiTransportError::invalid_request(format!("invalid url {joined}: {error}")))?;

    let Some(params) = query else {
        return Ok(url);
    };
    let Value::Object(params) = params else {
        return Err(ApiTransportError::invalid_request(
            "query parameters must be a JSON object",
        ));
    };
    if params.is_empty() {
        return Ok(url);
    }
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        pairs.append_pair(key, &query_value(item));
                    }
                }
                other => {
                    pairs.append_pair(key, &query_value(other));
                }
            }
        }
    }
    Ok(url)
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Empty bodies read as `null`; bodies that are not JSON become a string.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn map_transport_error(error: reqwest::Error) -> ApiTransportError {
    if error.is_timeout() {
        ApiTransportError::timeout(error.to_string())
    } else {
        ApiTransportError::network(error.to_string())
    }
}
