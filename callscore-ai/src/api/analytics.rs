//! Dashboard analytics for one meeting

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use super::auth::{Identity, MEMBER_ROLES};
use crate::db::{history, meetings};
use crate::error::{ApiError, ApiResult};
use crate::limits::{resolve_limit, DEFAULT_ANALYTICS_LIMIT};
use crate::services::{aggregate, AggregatedAnalytics};
use crate::AppState;

/// GET /api/meetings/:id/analytics?limit=...
pub async fn meeting_analytics(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(meeting_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<AggregatedAnalytics>> {
    identity.authorize(MEMBER_ROLES)?;

    let limit = resolve_limit(params.get("limit").map(String::as_str), DEFAULT_ANALYTICS_LIMIT);

    meetings::find_in_org(&state.db, &meeting_id, &identity.org_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Meeting not found: {}", meeting_id)))?;

    let items = history::recent_with_scores(&state.db, &meeting_id, limit).await?;
    Ok(Json(aggregate(&items)))
}
