//! Catalog query endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use regindex_catalog::{QueryArgs, RepositoryWithTags};
use serde::Deserialize;

/// Response header announcing the index to cross-origin callers.
pub const CSPHERE_HEADER: &str = "csphere";

/// Raw query string of `GET /index`.
///
/// Numbers are kept as strings so unparsable values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub keyword: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
}

impl IndexQuery {
    /// Convert to normalized query arguments.
    pub fn into_args(self) -> QueryArgs {
        QueryArgs::new(
            self.keyword,
            parse_or_zero(self.skip.as_deref()),
            parse_or_zero(self.limit.as_deref()),
        )
        .normalized()
    }
}

fn parse_or_zero(value: Option<&str>) -> i64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// GET /index?keyword=&skip=&limit=
pub async fn get_index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> ApiResult<Json<Vec<RepositoryWithTags>>> {
    let args = query.into_args();
    let page = state.catalog.list_repositories(&args).await?;
    tracing::debug!(
        keyword = ?args.keyword,
        skip = args.skip,
        limit = args.limit,
        returned = page.len(),
        "Index page served"
    );
    Ok(Json(page))
}

/// OPTIONS /index
pub async fn announce_csphere() -> impl IntoResponse {
    (StatusCode::OK, [(CSPHERE_HEADER, "true")])
}
