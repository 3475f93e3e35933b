//! Per-request options and cache keys.

use std::time::Duration;

use serde_json::Value;

use crate::domain::ports::HttpMethod;

/// Knobs a caller may set on one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Send without a bearer token and never refresh on 401.
    pub skip_auth: bool,
    /// Bypass the GET response cache for both reads and writes.
    pub skip_cache: bool,
    /// Override the client's retry bound.
    pub retries: Option<u32>,
    /// Override how long a GET response stays cached.
    pub cache_ttl: Option<Duration>,
}

impl RequestOptions {
    /// Send without a bearer token.
    #[must_use]
    pub const fn without_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Bypass the response cache.
    #[must_use]
    pub const fn without_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Retry at most `retries` times after the first attempt.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Cache a GET response for `ttl`.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }
}

/// Key under which a response is cached: `METHOD:path:params-json`.
///
/// Missing params encode as `{}` so a bare path and an empty parameter
/// object share an entry.
pub(crate) fn cache_key(method: HttpMethod, path: &str, params: Option<&Value>) -> String {
    let params = params.map_or_else(|| "{}".to_owned(), Value::to_string);
    format!("{method}:{path}:{params}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn cache_keys_include_method_path_and_params() {
        assert_eq!(
            cache_key(HttpMethod::Get, "/jobs", Some(&json!({"limit": 20}))),
            r#"GET:/jobs:{"limit":20}"#
        );
        assert_eq!(cache_key(HttpMethod::Get, "/jobs", None), "GET:/jobs:{}");
    }

    #[rstest]
    fn param_order_does_not_change_the_key() {
        let a = cache_key(HttpMethod::Get, "/jobs", Some(&json!({"a": 1, "b": 2})));
        let b = cache_key(HttpMethod::Get, "/jobs", Some(&json!({"b": 2, "a": 1})));
        assert_eq!(a, b);
    }

    #[rstest]
    fn builders_compose() {
        let options = RequestOptions::default()
            .without_auth()
            .with_retries(0)
            .with_cache_ttl(Duration::from_secs(1));
        assert!(options.skip_auth);
        assert!(!options.skip_cache);
        assert_eq!(options.retries, Some(0));
    }
}
