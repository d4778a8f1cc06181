//! Application state shared across handlers.

use regindex_catalog::{CatalogStore, IndexSink};
use regindex_core::config::AppConfig;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Catalog store, shared with the sink.
    pub catalog: Arc<dyn CatalogStore>,
    /// Sink applying registry notifications to the catalog.
    pub sink: IndexSink,
}

impl AppState {
    /// Create the state; the sink writes through the same catalog handle the
    /// query and patch handlers read from.
    pub fn new(config: AppConfig, catalog: Arc<dyn CatalogStore>) -> Self {
        let sink = IndexSink::new(catalog.clone());
        Self {
            config: Arc::new(config),
            catalog,
            sink,
        }
    }
}
