//! Port for delivering analytics events.

use crate::domain::AnalyticsEvent;

/// Receives every event [`crate::domain::Analytics`] records.
///
/// Delivery is fire-and-forget; a sink never fails the caller.
#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsSink: Send + Sync {
    /// Deliver one stamped event.
    fn record(&self, event: &AnalyticsEvent);
}
