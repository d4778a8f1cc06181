//! Catalog store error types.

use thiserror::Error;

/// Catalog store operation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The database could not be opened or its directory created.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A statement failed to prepare or execute.
    #[error("database error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
