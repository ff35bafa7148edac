//! Meeting listing and meeting resolution for submissions

use axum::{extract::State, Extension, Json};
use callscore_common::db::Meeting;
use callscore_common::time;
use serde::Serialize;

use super::auth::{Identity, MEMBER_ROLES};
use crate::db::meetings;
use crate::error::{ApiError, ApiResult};
use crate::limits::RECENT_MEETINGS;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeetingsResponse {
    pub meetings: Vec<Meeting>,
}

/// GET /api/meetings
pub async fn list_meetings(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<MeetingsResponse>> {
    identity.authorize(MEMBER_ROLES)?;

    let meetings = meetings::recent_for_user(&state.db, &identity.user_id, RECENT_MEETINGS).await?;
    Ok(Json(MeetingsResponse { meetings }))
}

/// Name used when a submission names no meeting
pub fn default_meeting_name() -> String {
    format!("Meeting on {}", time::local_date_label())
}

/// Meeting a submission belongs to
///
/// An explicit id must exist in the caller's organization. Otherwise the
/// trimmed name (or the dated default) is looked up among the caller's
/// meetings and created when missing.
pub async fn resolve_target_meeting(
    state: &AppState,
    identity: &Identity,
    meeting_id: Option<&str>,
    meeting_name: Option<&str>,
) -> ApiResult<Meeting> {
    if let Some(id) = meeting_id.filter(|id| !id.is_empty()) {
        return meetings::find_in_org(&state.db, id, &identity.org_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Meeting not found: {}", id)));
    }

    let name = meeting_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default_meeting_name);

    Ok(meetings::find_or_create(&state.db, &name, &identity.user_id, &identity.org_id).await?)
}
