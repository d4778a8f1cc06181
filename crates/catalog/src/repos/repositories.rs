//! Repository table operations.

use crate::error::CatalogResult;
use crate::models::{QueryArgs, RepositoryWithTags};
use async_trait::async_trait;

/// Repository for the `repositories` table.
#[async_trait]
pub trait RepositoryRepo: Send + Sync {
    /// Insert a repository, replacing an existing row with the same name.
    async fn upsert_repository(&self, repository: &str) -> CatalogResult<()>;

    /// Delete every repository no tag refers to anymore.
    /// Returns the number of rows removed.
    async fn prune_orphan_repositories(&self) -> CatalogResult<u64>;

    /// List a page of repositories, each with its complete tag set.
    ///
    /// Arguments are normalized before use. A failure while reading one
    /// repository's tags is logged and truncates that repository's tag list
    /// instead of failing the whole page.
    async fn list_repositories(&self, args: &QueryArgs) -> CatalogResult<Vec<RepositoryWithTags>>;

    /// Number of indexed repositories.
    async fn count_repositories(&self) -> CatalogResult<u64>;
}
