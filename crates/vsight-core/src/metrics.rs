//! Analysis workflow metrics.

use metrics::{counter, histogram};

use vsight_models::ErrorKind;

/// Metric name constants for consistency.
pub mod names {
    /// Finished analysis requests by outcome (`completed` or an error code).
    pub const ANALYSES_TOTAL: &str = "analysis_requests_total";

    /// Status re-queries needed before the asset reached a terminal state.
    pub const POLL_ATTEMPTS: &str = "analysis_poll_attempts";

    /// End-to-end analysis duration in seconds.
    pub const DURATION_SECONDS: &str = "analysis_duration_seconds";
}

/// Record a finished analysis; `None` means success.
pub fn record_outcome(error: Option<ErrorKind>, duration_secs: f64) {
    let outcome = error.map(|k| k.as_code()).unwrap_or("completed");

    counter!(names::ANALYSES_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::DURATION_SECONDS, "outcome" => outcome).record(duration_secs);
}

pub fn record_poll_attempts(attempts: u32) {
    histogram!(names::POLL_ATTEMPTS).record(attempts as f64);
}
