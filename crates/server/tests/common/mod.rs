//! Common test utilities for server tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use regindex_catalog::{CatalogStore, SqliteStore};
use regindex_core::config::AppConfig;
use regindex_server::{AppState, create_router};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use time::OffsetDateTime;
use tower::ServiceExt;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a test server backed by an in-memory catalog.
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let catalog: Arc<dyn CatalogStore> = Arc::new(
            SqliteStore::in_memory()
                .await
                .expect("Failed to create catalog store"),
        );
        Self::with_catalog(temp_dir, catalog)
    }

    /// Create a test server whose catalog is a database file under a temporary root.
    pub async fn on_disk() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let config = AppConfig::for_testing(temp_dir.path().join("registry"));
        let catalog = regindex_catalog::from_config(&config)
            .await
            .expect("Failed to create catalog store");
        Self::with_catalog(temp_dir, catalog)
    }

    fn with_catalog(temp_dir: TempDir, catalog: Arc<dyn CatalogStore>) -> Self {
        let config = AppConfig::for_testing(temp_dir.path().join("registry"));
        let state = AppState::new(config, catalog);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    pub fn catalog(&self) -> Arc<dyn CatalogStore> {
        self.state.catalog.clone()
    }

    /// Index a tag directly through the catalog.
    pub async fn push(&self, repository: &str, tag: &str) {
        self.state
            .catalog
            .record_push(
                repository,
                tag,
                &format!("sha256:{}", repository.replace('/', "-")),
                &format!("http://registry.local:5000/v2/{repository}/manifests/{tag}"),
                OffsetDateTime::now_utc(),
            )
            .await
            .expect("Failed to record push");
    }

    /// Send a request and collect the status and raw body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body.to_vec())
    }
}

/// Repository names in a `GET /index` response.
#[allow(dead_code)]
pub fn repository_names(page: &Value) -> Vec<String> {
    page.as_array()
        .expect("index response is an array")
        .iter()
        .map(|r| r["repository"].as_str().unwrap().to_string())
        .collect()
}
