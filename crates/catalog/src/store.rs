//! Catalog store trait and the SQLite implementation.

use crate::error::{CatalogError, CatalogResult};
use crate::repos::{RepositoryRepo, TagRepo};
use async_trait::async_trait;
use regindex_core::config::{IndexConfig, StorageConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;

/// Combined catalog store trait.
#[async_trait]
pub trait CatalogStore: RepositoryRepo + TagRepo + Send + Sync {
    /// Create tables and indexes if they do not exist yet.
    async fn migrate(&self) -> CatalogResult<()>;

    /// Check database connectivity.
    async fn health_check(&self) -> CatalogResult<()>;

    /// Index a pushed tag: make sure its repository exists, then replace the tag row.
    async fn record_push(
        &self,
        repository: &str,
        tag: &str,
        digest: &str,
        url: &str,
        updated_at: OffsetDateTime,
    ) -> CatalogResult<()> {
        self.upsert_repository(repository).await?;
        self.upsert_tag(repository, tag, digest, url, updated_at)
            .await
    }

    /// Drop a deleted tag and any repository left without tags.
    /// Returns whether the tag row existed.
    async fn remove_tag(&self, repository: &str, tag: &str) -> CatalogResult<bool> {
        let removed = self.delete_tag(repository, tag).await?;
        self.prune_orphan_repositories().await?;
        Ok(removed)
    }

    /// Close the underlying connections. Later calls fail with a database error.
    async fn close(&self);
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id          INTEGER PRIMARY KEY,
    repository  VARCHAR(256) NOT NULL,
    digest      VARCHAR(80) NOT NULL,
    url         VARCHAR(256) NOT NULL,
    tag         VARCHAR(256) NOT NULL,
    status      VARCHAR(32) NOT NULL DEFAULT 'unset',
    description VARCHAR(256) NOT NULL DEFAULT '',
    target_url  VARCHAR(256) NOT NULL DEFAULT '',
    updated_at  DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_name_tag ON tags (repository, tag);

CREATE TABLE IF NOT EXISTS repositories (
    id         INTEGER PRIMARY KEY,
    repository VARCHAR(256) NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_name ON repositories (repository);
"#;

/// SQLite-based catalog store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn new(path: impl AsRef<Path>, busy_timeout: Duration) -> CatalogResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CatalogError::StorageUnavailable(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(busy_timeout);

        let store = Self::connect(opts).await?;
        tracing::info!(path = %path.display(), "Index database opened");
        Ok(store)
    }

    /// Open the database described by the index and storage configuration.
    pub async fn from_config(index: &IndexConfig, storage: &StorageConfig) -> CatalogResult<Self> {
        Self::new(index.database_path(storage), index.busy_timeout()).await
    }

    /// Create an isolated in-memory store (each call gets its own database).
    pub async fn in_memory() -> CatalogResult<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| CatalogError::StorageUnavailable(e.to_string()))?;
        Self::connect(opts).await
    }

    async fn connect(opts: SqliteConnectOptions) -> CatalogResult<Self> {
        let pool = SqlitePoolOptions::new()
            // A single connection serializes statements and keeps an
            // in-memory database alive for the lifetime of the pool.
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(|e| CatalogError::StorageUnavailable(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn migrate(&self) -> CatalogResult<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to prepare index database"))?;
        Ok(())
    }

    async fn health_check(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn record_push(
        &self,
        repository: &str,
        tag: &str,
        digest: &str,
        url: &str,
        updated_at: OffsetDateTime,
    ) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;
        statements::upsert_repository(&mut *tx, repository).await?;
        statements::upsert_tag(&mut *tx, repository, tag, digest, url, updated_at).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove_tag(&self, repository: &str, tag: &str) -> CatalogResult<bool> {
        let mut tx = self.pool.begin().await?;
        let removed = statements::delete_tag(&mut *tx, repository, tag).await?;
        statements::prune_orphan_repositories(&mut *tx).await?;
        tx.commit().await?;
        Ok(removed > 0)
    }

    async fn close(&self) {
        tracing::debug!("Closing index database");
        self.pool.close().await;
    }
}

/// Single statements shared by the pooled and transactional code paths.
mod statements {
    use regindex_core::STATUS_UNSET;
    use sqlx::{Executor, Sqlite};
    use time::OffsetDateTime;

    pub(super) async fn upsert_repository<'e, E>(
        executor: E,
        repository: &str,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("REPLACE INTO repositories (repository) VALUES (?)")
            .bind(repository)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub(super) async fn upsert_tag<'e, E>(
        executor: E,
        repository: &str,
        tag: &str,
        digest: &str,
        url: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            REPLACE INTO tags (repository, tag, digest, url, updated_at, status, description, target_url)
            VALUES (?, ?, ?, ?, ?, ?, '', '')
            "#,
        )
        .bind(repository)
        .bind(tag)
        .bind(digest)
        .bind(url)
        .bind(updated_at)
        .bind(STATUS_UNSET)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub(super) async fn delete_tag<'e, E>(
        executor: E,
        repository: &str,
        tag: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tags WHERE repository = ? AND tag = ?")
            .bind(repository)
            .bind(tag)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub(super) async fn prune_orphan_repositories<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "DELETE FROM repositories WHERE repository NOT IN (SELECT DISTINCT repository FROM tags)",
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use futures::StreamExt;

    const TAG_COLUMNS: &str =
        "repository, tag, digest, url, status, description, target_url, updated_at";

    #[async_trait]
    impl RepositoryRepo for SqliteStore {
        async fn upsert_repository(&self, repository: &str) -> CatalogResult<()> {
            statements::upsert_repository(&self.pool, repository)
                .await
                .inspect_err(|e| tracing::error!(repository, error = %e, "Repository upsert failed"))?;
            Ok(())
        }

        async fn prune_orphan_repositories(&self) -> CatalogResult<u64> {
            let pruned = statements::prune_orphan_repositories(&self.pool).await?;
            Ok(pruned)
        }

        async fn list_repositories(
            &self,
            args: &QueryArgs,
        ) -> CatalogResult<Vec<RepositoryWithTags>> {
            let args = args.clone().normalized();

            // instr() keeps the match case-sensitive and treats % and _ literally.
            let repositories = match args.keyword.as_deref() {
                Some(keyword) => {
                    sqlx::query_as::<_, RepositoryRow>(
                        "SELECT repository FROM repositories WHERE instr(repository, ?) > 0 ORDER BY repository LIMIT ? OFFSET ?",
                    )
                    .bind(keyword)
                    .bind(args.limit)
                    .bind(args.skip)
                    .fetch_all(&self.pool)
                    .await
                }
                None => {
                    sqlx::query_as::<_, RepositoryRow>(
                        "SELECT repository FROM repositories ORDER BY repository LIMIT ? OFFSET ?",
                    )
                    .bind(args.limit)
                    .bind(args.skip)
                    .fetch_all(&self.pool)
                    .await
                }
            }
            .inspect_err(|e| tracing::error!(error = %e, "Repository listing failed"))?;

            let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE repository = ? ORDER BY tag");
            let mut page = Vec::with_capacity(repositories.len());
            for RepositoryRow { repository } in repositories {
                let mut tags = Vec::new();
                let mut rows = sqlx::query_as::<_, TagRow>(&query)
                    .bind(&repository)
                    .fetch(&self.pool);
                while let Some(row) = rows.next().await {
                    match row {
                        Ok(tag) => tags.push(tag),
                        Err(e) => {
                            tracing::error!(
                                repository = %repository,
                                error = %e,
                                "Failed to scan tag rows, skipping the rest of this repository"
                            );
                            break;
                        }
                    }
                }
                drop(rows);
                page.push(RepositoryWithTags { repository, tags });
            }
            Ok(page)
        }

        async fn count_repositories(&self) -> CatalogResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM repositories")
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }
    }

    #[async_trait]
    impl TagRepo for SqliteStore {
        async fn upsert_tag(
            &self,
            repository: &str,
            tag: &str,
            digest: &str,
            url: &str,
            updated_at: OffsetDateTime,
        ) -> CatalogResult<()> {
            statements::upsert_tag(&self.pool, repository, tag, digest, url, updated_at)
                .await
                .inspect_err(|e| tracing::error!(repository, tag, error = %e, "Tag upsert failed"))?;
            Ok(())
        }

        async fn delete_tag(&self, repository: &str, tag: &str) -> CatalogResult<bool> {
            let removed = statements::delete_tag(&self.pool, repository, tag).await?;
            Ok(removed > 0)
        }

        async fn get_tag(&self, repository: &str, tag: &str) -> CatalogResult<Option<TagRow>> {
            let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE repository = ? AND tag = ?");
            let row = sqlx::query_as::<_, TagRow>(&query)
                .bind(repository)
                .bind(tag)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn patch_tag_status(
            &self,
            repository: &str,
            tag: &str,
            update: &TagStatusUpdate,
        ) -> CatalogResult<()> {
            let result = sqlx::query(
                "UPDATE tags SET status = ?, description = ?, target_url = ? WHERE repository = ? AND tag = ?",
            )
            .bind(&update.status)
            .bind(&update.description)
            .bind(&update.target_url)
            .bind(repository)
            .bind(tag)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CatalogError::NotFound(format!(
                    "tag {repository}:{tag} not found"
                )));
            }
            Ok(())
        }
    }
}
