//! Catalog store and notification sink for the registry tag index.
//!
//! This crate owns the derived catalog:
//! - The `repositories` and `tags` tables and every query over them
//! - The sink that turns registry push/delete notifications into catalog writes

pub mod error;
pub mod models;
pub mod repos;
pub mod sink;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use models::{QueryArgs, RepositoryRow, RepositoryWithTags, TagRow, TagStatusUpdate};
pub use sink::{IndexSink, SinkReport};
pub use store::{CatalogStore, SqliteStore};

use regindex_core::config::AppConfig;
use std::sync::Arc;

/// Create a catalog store from configuration.
pub async fn from_config(config: &AppConfig) -> CatalogResult<Arc<dyn CatalogStore>> {
    let store = SqliteStore::from_config(&config.index, &config.storage).await?;
    Ok(Arc::new(store) as Arc<dyn CatalogStore>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_creates_database_under_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("registry");
        let config = AppConfig::for_testing(&root);

        let store = from_config(&config).await.unwrap();
        store.health_check().await.unwrap();
        assert!(root.join("registry.sqlite3").exists());
    }
}
