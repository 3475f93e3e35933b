//! Port and runtime dependency bundles for the API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{AlwaysConnected, ApiTransport, Connectivity, KeyValueStore};

use super::RetrySleeper;

/// Port bundle required by the API client.
pub struct ApiClientPorts {
    /// Outbound HTTP adapter.
    pub transport: Arc<dyn ApiTransport>,
    /// Local store holding the session and cached responses.
    pub store: Arc<dyn KeyValueStore>,
    /// Reachability check.
    pub connectivity: Arc<dyn Connectivity>,
}

impl ApiClientPorts {
    /// Bundle `transport` and `store` with an always-connected check.
    pub fn new(transport: Arc<dyn ApiTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            transport,
            store,
            connectivity: Arc::new(AlwaysConnected),
        }
    }

    /// Replace the reachability check.
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }
}

/// Time sources used for cache expiry and retry delays.
pub struct ApiClientRuntime {
    /// Wall clock for cache expiry.
    pub clock: Arc<dyn Clock>,
    /// Async sleep between retries.
    pub sleeper: Arc<dyn RetrySleeper>,
}

impl Default for ApiClientRuntime {
    fn default() -> Self {
        Self {
            clock: Arc::new(DefaultClock),
            sleeper: Arc::new(TokioSleeper),
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
