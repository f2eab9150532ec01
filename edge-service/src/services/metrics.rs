//! Prometheus metrics for edge-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Permission decisions by outcome (allowed, denied, error).
pub static PERMISSION_CHECKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "edge_permission_checks_total",
        "Total number of action permission checks",
        &["action", "outcome"]
    )
    .expect("Failed to register permission_checks_total")
});

/// Exit node configuration builds by status.
pub static PEER_CONFIG_BUILDS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "edge_peer_config_builds_total",
        "Total number of exit node configuration builds",
        &["status"]
    )
    .expect("Failed to register peer_config_builds_total")
});

/// Peer config build duration.
pub static PEER_CONFIG_BUILD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "edge_peer_config_build_duration_seconds",
        "Exit node configuration build duration in seconds",
        &["status"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register peer_config_build_duration")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "edge_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "edge_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&PERMISSION_CHECKS_TOTAL);
    Lazy::force(&PEER_CONFIG_BUILDS_TOTAL);
    Lazy::force(&PEER_CONFIG_BUILD_DURATION);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Record one permission decision.
pub fn record_permission_check(action: &str, outcome: &str) {
    PERMISSION_CHECKS_TOTAL
        .with_label_values(&[action, outcome])
        .inc();
}

/// Record an error by type.
pub fn record_error(error_type: &str) {
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
