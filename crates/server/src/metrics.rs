//! Prometheus metrics for the index server.
//!
//! The `/metrics` endpoint is unauthenticated; restrict it at the network
//! level when the index runs next to a public registry.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use regindex_catalog::SinkReport;
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static EVENTS_APPLIED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "regindex_events_applied_total",
            "Manifest events written to the catalog, by action",
        ),
        &["action"],
    )
    .expect("metric creation failed")
});

pub static EVENTS_IGNORED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "regindex_events_ignored_total",
        "Events skipped because they target a layer or carry another action",
    )
    .expect("metric creation failed")
});

pub static EVENT_BATCHES_FAILED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "regindex_event_batches_failed_total",
        "Notification batches aborted by a catalog error",
    )
    .expect("metric creation failed")
});

pub static TAG_STATUS_PATCHES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "regindex_tag_status_patches_total",
        "Review status updates applied to tags",
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent: calls after the first are no-ops.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(EVENTS_APPLIED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(EVENTS_IGNORED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(EVENT_BATCHES_FAILED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(TAG_STATUS_PATCHES.clone()))
            .expect("metric registration failed");
    });
}

/// Record the outcome of an applied notification batch.
pub fn record_sink_report(report: &SinkReport) {
    EVENTS_APPLIED
        .with_label_values(&["push"])
        .inc_by(report.pushed);
    EVENTS_APPLIED
        .with_label_values(&["delete"])
        .inc_by(report.deleted);
    EVENTS_IGNORED.inc_by(report.ignored);
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration_is_idempotent() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_record_sink_report_counts_by_action() {
        let before = EVENTS_APPLIED.with_label_values(&["push"]).get();
        record_sink_report(&SinkReport {
            pushed: 3,
            deleted: 0,
            ignored: 1,
        });
        assert!(EVENTS_APPLIED.with_label_values(&["push"]).get() >= before + 3);
    }
}
