//! Database models
//!
//! Records serialize in camelCase because they are returned verbatim by the
//! HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::auth::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// User account without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub org_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub org_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: String,
    pub meeting_id: String,
    pub text: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

/// Stored analysis result for one transcript
///
/// Numeric fields are optional: whatever the model produced is stored
/// without validation, including absent keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: String,
    pub transcript_id: String,
    pub pitch_score: Option<f64>,
    pub conversion_score: Option<f64>,
    pub rapport_score: Option<f64>,
    pub objection_score: Option<f64>,
    pub closing_score: Option<f64>,
    pub overall: Option<f64>,
    pub rationale: Option<String>,
    pub raw_model_output: String,
    pub created_at: DateTime<Utc>,
}

/// Retrieval item: a transcript paired with its score, if one was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptWithScore {
    pub transcript: Transcript,
    pub score: Option<Score>,
}
