//! Port reporting whether the device currently has a network connection.

use async_trait::async_trait;

/// Network reachability check consulted before each API request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Returns `true` when requests are worth attempting.
    async fn is_connected(&self) -> bool;
}

/// Probe that always reports a connection; the transport surfaces real
/// failures instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConnected;

#[async_trait]
impl Connectivity for AlwaysConnected {
    async fn is_connected(&self) -> bool {
        true
    }
}
