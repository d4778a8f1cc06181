//! Database models mapping to the catalog schema.

use regindex_core::DEFAULT_PAGE_LIMIT;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Repository record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RepositoryRow {
    pub repository: String,
}

/// Tag record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TagRow {
    pub repository: String,
    pub tag: String,
    pub digest: String,
    pub url: String,
    /// Free-form review status; "unset" until a verifier patches it.
    pub status: String,
    pub description: String,
    pub target_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A repository together with every tag it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryWithTags {
    pub repository: String,
    pub tags: Vec<TagRow>,
}

/// Review metadata written by the status patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStatusUpdate {
    pub status: String,
    pub description: String,
    pub target_url: String,
}

/// Arguments of a paginated repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryArgs {
    /// Case-sensitive substring the repository name must contain.
    pub keyword: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            keyword: None,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl QueryArgs {
    pub fn new(keyword: Option<String>, skip: i64, limit: i64) -> Self {
        Self {
            keyword,
            skip,
            limit,
        }
    }

    /// Clamp out-of-range values: negative skips start at zero, non-positive
    /// limits fall back to the default page size, and an empty keyword means
    /// no filter.
    pub fn normalized(self) -> Self {
        Self {
            keyword: self.keyword.filter(|k| !k.is_empty()),
            skip: self.skip.max(0),
            limit: if self.limit < 1 {
                DEFAULT_PAGE_LIMIT
            } else {
                self.limit
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_skip_and_limit() {
        let args = QueryArgs::new(None, -5, 0).normalized();
        assert_eq!(args.skip, 0);
        assert_eq!(args.limit, DEFAULT_PAGE_LIMIT);

        let args = QueryArgs::new(None, 7, -1).normalized();
        assert_eq!(args.skip, 7);
        assert_eq!(args.limit, DEFAULT_PAGE_LIMIT);

        let args = QueryArgs::new(None, 3, 50).normalized();
        assert_eq!(args.skip, 3);
        assert_eq!(args.limit, 50);
    }

    #[test]
    fn test_normalized_drops_empty_keyword() {
        let args = QueryArgs::new(Some(String::new()), 0, 10).normalized();
        assert_eq!(args.keyword, None);

        let args = QueryArgs::new(Some("alpha".to_string()), 0, 10).normalized();
        assert_eq!(args.keyword.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_tag_row_serializes_rfc3339_timestamp() {
        let row = TagRow {
            repository: "library/app".to_string(),
            tag: "latest".to_string(),
            digest: "sha256:abc".to_string(),
            url: "http://registry/v2/library/app/manifests/latest".to_string(),
            status: "unset".to_string(),
            description: String::new(),
            target_url: String::new(),
            updated_at: time::macros::datetime!(2024-05-01 12:30:00 UTC),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["updated_at"], "2024-05-01T12:30:00Z");
        assert_eq!(value["target_url"], "");
        assert_eq!(value["status"], "unset");
    }
}
