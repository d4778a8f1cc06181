//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Catalog queries; OPTIONS announces the index to cross-origin callers
        .route(
            "/index",
            get(handlers::get_index).options(handlers::announce_csphere),
        )
        // Review status written by external verifiers
        .route("/tag-status", patch(handlers::set_tag_status))
        // Registry notification endpoint
        .route("/events", post(handlers::receive_events))
        .route("/health", get(handlers::health_check));

    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
