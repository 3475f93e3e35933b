//! Analytics delivery.

mod tracing_sink;

pub use tracing_sink::TracingAnalyticsSink;
