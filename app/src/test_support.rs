//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`). Compiled for tests and behind the `test-support` feature.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::Value;
use tempfile::TempDir;

use crate::domain::ports::{
    AnalyticsSink, ApiTransport, ApiTransportError, KeyValueStore, TransportRequest,
    TransportResponse,
};
use crate::domain::{AnalyticsEvent, ApiClient, ApiClientConfig, ApiClientPorts, ApiClientRuntime, RetrySleeper};
use crate::outbound::storage::FileKeyValueStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock fixed at 2026-03-01T09:00:00Z.
    pub fn fixed() -> Self {
        let now = match Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single() {
            Some(now) => now,
            None => panic!("fixed timestamp is valid"),
        };
        Self::new(now)
    }

    /// Move time forward.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *lock(&self.0) += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Sleeper that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl RetrySleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Sleeper that records every requested delay and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Delays requested so far.
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.0).clone()
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0).push(duration);
    }
}

/// Transport that replays a fixed script of outcomes and records requests.
///
/// Once the script runs out every call fails with a network error.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, ApiTransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    /// Replay `script` in order.
    pub fn new(script: Vec<Result<TransportResponse, ApiTransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Successful or failed HTTP response with `body`.
    pub fn reply(status: u16, body: Value) -> Result<TransportResponse, ApiTransportError> {
        Ok(TransportResponse { status, body })
    }

    /// Number of requests received.
    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Requests received, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, ApiTransportError> {
        lock(&self.requests).push(request.clone());
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Err(ApiTransportError::network("script exhausted")))
    }
}

/// Analytics sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAnalyticsSink(Mutex<Vec<AnalyticsEvent>>);

impl RecordingAnalyticsSink {
    /// Events recorded so far, oldest first.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        lock(&self.0).clone()
    }

    /// Names of the events recorded so far.
    pub fn names(&self) -> Vec<String> {
        lock(&self.0).iter().map(|event| event.name.clone()).collect()
    }
}

impl AnalyticsSink for RecordingAnalyticsSink {
    fn record(&self, event: &AnalyticsEvent) {
        lock(&self.0).push(event.clone());
    }
}

/// File-backed store in a fresh temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the store is used.
pub fn temp_file_store() -> (TempDir, PathBuf, Arc<FileKeyValueStore>) {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("failed to create temp dir: {error}"),
    };
    let path = dir.path().join("findmyjob-store.json");
    let store = match FileKeyValueStore::open(&path) {
        Ok(store) => store,
        Err(error) => panic!("failed to open temp store: {error}"),
    };
    (dir, path, Arc::new(store))
}

/// API client over `transport` and `store` with a fixed clock and no retry
/// delays.
pub fn instant_api_client(
    transport: Arc<dyn ApiTransport>,
    store: Arc<dyn KeyValueStore>,
) -> ApiClient {
    ApiClient::with_runtime(
        ApiClientPorts::new(transport, store),
        ApiClientRuntime {
            clock: Arc::new(MutableClock::fixed()),
            sleeper: Arc::new(ImmediateSleeper),
        },
        ApiClientConfig::default(),
    )
}
