//! HTTP API client with token refresh, response caching and retry.
//!
//! Every request goes through the same pipeline:
//!
//! 1. GETs are answered from the TTL cache when a live entry exists.
//! 2. The connectivity check is consulted; offline fails fast.
//! 3. Up to `retries + 1` attempts are made. Each attempt attaches the
//!    bearer token and, on a 401, refreshes the token once (single-flight
//!    across concurrent requests) and replays.
//! 4. Retryable failures wait `attempt × retry_delay` before the next try.
//! 5. Successful non-null GET bodies are cached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::cache::{CacheNamespace, TtlCache};
use crate::domain::ports::{
    ApiTransport, Connectivity, HttpMethod, TransportRequest, TransportResponse,
};
use crate::domain::session::{AuthTokens, SessionKey, SessionStore};

mod error;
mod refresh;
mod request;
mod runtime;

pub use error::{ApiError, ApiErrorKind};
pub use request::RequestOptions;
pub use runtime::{ApiClientPorts, ApiClientRuntime, TokioSleeper};

use refresh::SingleFlightRefresh;
use request::cache_key;

/// Path that exchanges a refresh token for a new token pair.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Retry and caching defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay; retry `n` waits `n × retry_delay`.
    pub retry_delay: Duration,
    /// Lifetime of cached GET responses.
    pub cache_ttl: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// Async sleeping abstraction for retry delays.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// Client for the FindMyJob REST API.
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    connectivity: Arc<dyn Connectivity>,
    sleeper: Arc<dyn RetrySleeper>,
    session: SessionStore,
    cache: TtlCache,
    refresh: SingleFlightRefresh,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Build a client with the default clock and Tokio sleeper.
    pub fn new(ports: ApiClientPorts, config: ApiClientConfig) -> Self {
        Self::with_runtime(ports, ApiClientRuntime::default(), config)
    }

    /// Build a client with explicit time sources.
    pub fn with_runtime(
        ports: ApiClientPorts,
        runtime: ApiClientRuntime,
        config: ApiClientConfig,
    ) -> Self {
        let ApiClientPorts {
            transport,
            store,
            connectivity,
        } = ports;
        Self {
            transport,
            connectivity,
            sleeper: runtime.sleeper,
            session: SessionStore::new(store.clone()),
            cache: TtlCache::new(store, runtime.clock),
            refresh: SingleFlightRefresh::default(),
            config,
        }
    }

    /// Session store the client reads tokens from.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `GET path?params`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<Value>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        decode(self.request(HttpMethod::Get, path, params, &options).await?)
    }

    /// `POST path` with a JSON body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        decode(self.request(HttpMethod::Post, path, body, &options).await?)
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        decode(self.request(HttpMethod::Put, path, body, &options).await?)
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        decode(self.request(HttpMethod::Patch, path, body, &options).await?)
    }

    /// `DELETE path`.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        decode(self.request(HttpMethod::Delete, path, None, &options).await?)
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) -> Result<(), ApiError> {
        let removed = self.cache.clear_namespace(&CacheNamespace::API)?;
        debug!(removed, "api cache cleared");
        Ok(())
    }

    /// Drop the cached response for one request.
    pub fn clear_cache_for(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Value>,
    ) -> Result<(), ApiError> {
        self.cache
            .remove(&CacheNamespace::API, &cache_key(method, path, params))?;
        Ok(())
    }

    /// Send a request and return the raw JSON body.
    ///
    /// For GET, `data` becomes query parameters; otherwise it is the body.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        data: Option<Value>,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let started = Instant::now();
        let result = self.dispatch(method, path, data, options).await;
        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => debug!(%method, path, elapsed_ms, "api request completed"),
            Err(error) => debug!(
                %method,
                path,
                elapsed_ms,
                status = error.status(),
                %error,
                "api request failed"
            ),
        }
        result
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        data: Option<Value>,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let cacheable = method == HttpMethod::Get && !options.skip_cache;
        let key = cacheable.then(|| cache_key(method, path, data.as_ref()));

        if let Some(hit) = key.as_deref().and_then(|key| self.cached(key)) {
            debug!(path, "api cache hit");
            return Ok(hit);
        }

        if !self.connectivity.is_connected().await {
            return Err(ApiError::offline());
        }

        let mut request = TransportRequest::new(method, path);
        if method == HttpMethod::Get {
            request.query = data;
        } else {
            request.body = data;
        }

        let body = self.send_with_retry(request, options).await?;

        if let Some(key) = key.as_deref() {
            if !body.is_null() {
                let ttl = options.cache_ttl.unwrap_or(self.config.cache_ttl);
                if let Err(error) = self.cache.set(&CacheNamespace::API, key, &body, ttl) {
                    warn!(%error, path, "failed to cache api response");
                }
            }
        }
        Ok(body)
    }

    fn cached(&self, key: &str) -> Option<Value> {
        match self.cache.get::<Value>(&CacheNamespace::API, key) {
            Ok(hit) => hit.filter(|value| !value.is_null()),
            Err(error) => {
                warn!(%error, "api cache read failed");
                None
            }
        }
    }

    async fn send_with_retry(
        &self,
        mut request: TransportRequest,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let retries = options.retries.unwrap_or(self.config.max_retries);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.attempt(&mut request, options).await {
                Ok(body) => return Ok(body),
                Err(error) if !should_retry(&error, options) || attempt > retries => {
                    return Err(error);
                }
                Err(error) => {
                    let delay = self.config.retry_delay.saturating_mul(attempt);
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt,
                        delay_ms = delay.as_millis(),
                        %error,
                        "retrying api request"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &mut TransportRequest,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let generation = self.refresh.generation();
        request.bearer_token = if options.skip_auth {
            None
        } else {
            self.session.access_token()?
        };

        let response = self.transport.send(request).await?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            "api response"
        );
        if response.status != 401 || options.skip_auth {
            return into_body(response);
        }

        let token = self
            .refresh
            .refresh(generation, || self.refresh_tokens())
            .await?;
        request.bearer_token = Some(token);
        let replay = self.transport.send(request).await?;
        into_body(replay)
    }

    async fn refresh_tokens(&self) -> Result<String, ApiError> {
        match self.exchange_refresh_token().await {
            Ok(access_token) => {
                debug!("access token refreshed");
                Ok(access_token)
            }
            Err(error) => {
                warn!(%error, "token refresh failed; clearing stored tokens");
                if let Err(clear_error) = self.session.clear_tokens() {
                    warn!(error = %clear_error, "failed to clear stored tokens");
                }
                Err(error.into_session_expired())
            }
        }
    }

    async fn exchange_refresh_token(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .session
            .get(SessionKey::RefreshToken)?
            .ok_or_else(ApiError::missing_refresh_token)?;
        let mut request = TransportRequest::new(HttpMethod::Post, REFRESH_PATH);
        request.body = Some(json!({ "refreshToken": refresh_token }));

        let body = into_body(self.transport.send(&request).await?)?;
        let RefreshResponse {
            access_token,
            refresh_token,
        } = decode(body)?;
        let tokens = AuthTokens::new(access_token, refresh_token);
        self.session.store_tokens(&tokens)?;
        Ok(tokens.access_token().to_owned())
    }
}

/// A 401 on an unauthenticated request is a rejection, not a stale token.
fn should_retry(error: &ApiError, options: &RequestOptions) -> bool {
    error.is_retryable() && !(options.skip_auth && error.status() == Some(401))
}

fn into_body(response: TransportResponse) -> Result<Value, ApiError> {
    if response.is_success() {
        Ok(response.body)
    } else {
        Err(ApiError::from_response(response.status, response.body))
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|err| ApiError::decode(format!("unexpected response shape: {err}")))
}

#[cfg(test)]
mod tests;
