//! Common test utilities for catalog tests.

use regindex_catalog::{CatalogResult, CatalogStore, SqliteStore};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use time::OffsetDateTime;

/// A test catalog wrapper that cleans up on drop.
#[allow(dead_code)]
pub struct TestCatalog {
    pub store: Arc<dyn CatalogStore>,
    sqlite_store: Arc<SqliteStore>,
    _temp_dir: Option<TempDir>,
}

#[allow(dead_code)]
impl TestCatalog {
    /// Create a catalog backed by a database file in a temporary directory.
    pub async fn new() -> CatalogResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("registry.sqlite3");
        let store = Arc::new(SqliteStore::new(&db_path, Duration::from_secs(5)).await?);

        Ok(Self {
            store: store.clone(),
            sqlite_store: store,
            _temp_dir: Some(temp_dir),
        })
    }

    /// Create an in-memory catalog (faster for tests).
    pub async fn in_memory() -> CatalogResult<Self> {
        let store = Arc::new(SqliteStore::in_memory().await?);

        Ok(Self {
            store: store.clone(),
            sqlite_store: store,
            _temp_dir: None,
        })
    }

    pub fn store(&self) -> Arc<dyn CatalogStore> {
        self.store.clone()
    }

    /// Get the SQLite connection pool for raw queries.
    pub fn pool(&self) -> &Pool<Sqlite> {
        self.sqlite_store.pool()
    }

    /// Index a tag the way a push event would.
    pub async fn push(&self, repository: &str, tag: &str) {
        self.store
            .record_push(
                repository,
                tag,
                &digest_for(repository, tag),
                &manifest_url(repository, tag),
                OffsetDateTime::now_utc(),
            )
            .await
            .expect("Failed to record push");
    }

    pub async fn repository_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM repositories")
            .fetch_one(self.pool())
            .await
            .expect("Failed to count repositories")
    }

    pub async fn tag_count(&self, repository: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE repository = ?")
            .bind(repository)
            .fetch_one(self.pool())
            .await
            .expect("Failed to count tags")
    }

    /// Repositories that have no tags left.
    pub async fn orphan_repositories(&self) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT repository FROM repositories WHERE repository NOT IN (SELECT repository FROM tags)",
        )
        .fetch_all(self.pool())
        .await
        .expect("Failed to query orphans")
    }

    /// Repositories referenced by tags but missing from the repositories table.
    pub async fn missing_repositories(&self) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT DISTINCT repository FROM tags WHERE repository NOT IN (SELECT repository FROM repositories)",
        )
        .fetch_all(self.pool())
        .await
        .expect("Failed to query missing repositories")
    }
}

/// Registry URL of a tagged manifest.
pub fn manifest_url(repository: &str, tag: &str) -> String {
    format!("http://registry.local:5000/v2/{repository}/manifests/{tag}")
}

/// Deterministic fake digest for a tag.
pub fn digest_for(repository: &str, tag: &str) -> String {
    let seed: u64 = repository
        .bytes()
        .chain(tag.bytes())
        .fold(0xcbf29ce484222325, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x100000001b3)
        });
    format!("sha256:{seed:016x}")
}
