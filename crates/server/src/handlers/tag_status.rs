//! Tag review status endpoint.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use regindex_catalog::TagStatusUpdate;
use serde::Deserialize;

/// Body of `PATCH /tag-status`. Absent fields decode as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagStatusRequest {
    pub repository: String,
    pub tag: String,
    pub status: String,
    pub description: String,
    pub target_url: String,
}

/// PATCH /tag-status
///
/// The body is decoded by hand so any JSON error, including a missing
/// content type or a non-string field, is a 400.
pub async fn set_tag_status(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let req: TagStatusRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let update = TagStatusUpdate {
        status: req.status,
        description: req.description,
        target_url: req.target_url,
    };
    state
        .catalog
        .patch_tag_status(&req.repository, &req.tag, &update)
        .await?;

    metrics::TAG_STATUS_PATCHES.inc();
    tracing::info!(
        repository = %req.repository,
        tag = %req.tag,
        status = %update.status,
        "Tag status updated"
    );
    Ok(StatusCode::NO_CONTENT)
}
