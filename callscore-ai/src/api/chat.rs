//! Analytics chat endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::auth::{Identity, MEMBER_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::services::analytics_chat::NOT_CONFIGURED_REPLY;
use crate::services::chat_formatter::turns_from_value;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub meeting_id: Option<Value>,
    pub context: Option<Value>,
    pub messages: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Absent, null, false, 0 and "" all count as missing
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// POST /api/analytics-chat
///
/// Without a model credential this answers 200 with an explanatory reply,
/// before the body is read or validated.
pub async fn analytics_chat(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    identity.authorize(MEMBER_ROLES)?;

    if !state.chat.is_configured() {
        return Ok(Json(ChatResponse {
            reply: NOT_CONFIGURED_REPLY.to_string(),
        }));
    }

    let Json(body) = payload?;
    let context = match &body.context {
        Some(context) if !is_missing(body.meeting_id.as_ref()) && !is_missing(Some(context)) => {
            context
        }
        _ => {
            return Err(ApiError::BadRequest(
                "meetingId and context are required".to_string(),
            ))
        }
    };

    let turns = turns_from_value(body.messages.as_ref());
    let reply = state.chat.reply(context, &turns).await?;

    Ok(Json(ChatResponse { reply }))
}
