//! HTTP surface for the registry tag index.
//!
//! This crate provides:
//! - Paginated, keyword-filtered catalog queries
//! - Tag review status updates
//! - The registry notification endpoint feeding the index sink
//! - Health and Prometheus metrics endpoints

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
