//! Tag table operations.

use crate::error::CatalogResult;
use crate::models::{TagRow, TagStatusUpdate};
use async_trait::async_trait;
use time::OffsetDateTime;

/// Repository for the `tags` table.
#[async_trait]
pub trait TagRepo: Send + Sync {
    /// Insert or fully replace the (repository, tag) row.
    ///
    /// Review fields are reset: status becomes "unset" and description and
    /// target URL are cleared.
    async fn upsert_tag(
        &self,
        repository: &str,
        tag: &str,
        digest: &str,
        url: &str,
        updated_at: OffsetDateTime,
    ) -> CatalogResult<()>;

    /// Delete a tag. Returns whether a row was removed; a missing tag is not an error.
    async fn delete_tag(&self, repository: &str, tag: &str) -> CatalogResult<bool>;

    /// Get a single tag.
    async fn get_tag(&self, repository: &str, tag: &str) -> CatalogResult<Option<TagRow>>;

    /// Overwrite status, description, and target URL of an existing tag.
    ///
    /// Fails with `NotFound` when the tag does not exist; no row is created.
    async fn patch_tag_status(
        &self,
        repository: &str,
        tag: &str,
        update: &TagStatusUpdate,
    ) -> CatalogResult<()>;
}
