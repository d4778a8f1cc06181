//! Registry notification endpoint.

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use regindex_core::Envelope;

/// POST /events
///
/// Applies the envelope's events in order. A catalog failure aborts the batch
/// with a 500 so the registry's delivery layer can retry it.
pub async fn receive_events(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let envelope = Envelope::from_json(&body)?;

    let report = state
        .sink
        .write(&envelope.events)
        .await
        .inspect_err(|_| metrics::EVENT_BATCHES_FAILED.inc())?;

    metrics::record_sink_report(&report);
    tracing::debug!(
        events = envelope.events.len(),
        pushed = report.pushed,
        deleted = report.deleted,
        ignored = report.ignored,
        "Notification batch applied"
    );
    Ok(StatusCode::OK)
}
