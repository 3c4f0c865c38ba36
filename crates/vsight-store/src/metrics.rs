//! Result cache metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total cache operations by operation and outcome.
    pub const OPERATIONS_TOTAL: &str = "analysis_cache_operations_total";

    /// Operation latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "analysis_cache_latency_seconds";
}

/// Record metrics for a completed cache operation.
pub fn record_operation(operation: &'static str, success: bool, latency_ms: f64) {
    counter!(
        names::OPERATIONS_TOTAL,
        "operation" => operation,
        "outcome" => if success { "ok" } else { "error" }
    )
    .increment(1);

    histogram!(names::LATENCY_SECONDS, "operation" => operation).record(latency_ms / 1000.0);
}
