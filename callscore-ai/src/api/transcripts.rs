//! Transcript submission and retrieval

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use callscore_common::db::{Score, Transcript, TranscriptWithScore};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::{Identity, MEMBER_ROLES};
use super::meetings::resolve_target_meeting;
use crate::db::{history, meetings, scores, transcripts};
use crate::error::{ApiError, ApiResult};
use crate::limits::{resolve_limit, DEFAULT_TRANSCRIPT_LIMIT};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTranscriptRequest {
    pub meeting_id: Option<String>,
    pub meeting_name: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitTranscriptResponse {
    pub transcript: Transcript,
    pub score: Score,
}

/// POST /api/transcripts
///
/// Always 201 once the transcript is stored: model failures produce a
/// fallback score rather than an error.
pub async fn submit_transcript(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<SubmitTranscriptRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitTranscriptResponse>)> {
    identity.authorize(MEMBER_ROLES)?;
    let Json(body) = payload?;

    let text = body
        .text
        .as_deref()
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Text is required".to_string()))?;

    let meeting = resolve_target_meeting(
        &state,
        &identity,
        body.meeting_id.as_deref(),
        body.meeting_name.as_deref(),
    )
    .await?;

    let mut transcript = transcripts::create(&state.db, &meeting.id, text).await?;

    let result = state.pipeline.analyze(text).await;
    let score = scores::create(&state.db, &transcript.id, &result).await?;

    transcripts::mark_processed(&state.db, &transcript.id).await?;
    transcript.processed = true;

    info!(
        meeting_id = %meeting.id,
        transcript_id = %transcript.id,
        overall = ?score.overall,
        "Transcript analyzed"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitTranscriptResponse { transcript, score }),
    ))
}

#[derive(Debug, Serialize)]
pub struct TranscriptHistoryResponse {
    pub items: Vec<TranscriptWithScore>,
}

/// GET /api/transcripts?meetingId=...&limit=...
pub async fn list_transcripts(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<TranscriptHistoryResponse>> {
    identity.authorize(MEMBER_ROLES)?;

    let meeting_id = params
        .get("meetingId")
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("meetingId is required".to_string()))?;
    let limit = resolve_limit(params.get("limit").map(String::as_str), DEFAULT_TRANSCRIPT_LIMIT);

    meetings::find_in_org(&state.db, meeting_id, &identity.org_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Meeting not found: {}", meeting_id)))?;

    let items = history::recent_with_scores(&state.db, meeting_id, limit).await?;
    Ok(Json(TranscriptHistoryResponse { items }))
}
