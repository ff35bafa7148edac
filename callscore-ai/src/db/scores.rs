//! Score records

use callscore_common::db::Score;
use callscore_common::{time, uuid_utils, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::parse_timestamp;
use crate::services::AnalysisResult;

const SCORE_COLUMNS: &str = "guid, transcript_guid, pitch_score, conversion_score, rapport_score, \
     objection_score, closing_score, overall, rationale, raw_model_output, created_at";

fn from_row(row: &SqliteRow) -> Result<Score> {
    Ok(Score {
        id: row.get("guid"),
        transcript_id: row.get("transcript_guid"),
        pitch_score: row.get("pitch_score"),
        conversion_score: row.get("conversion_score"),
        rapport_score: row.get("rapport_score"),
        objection_score: row.get("objection_score"),
        closing_score: row.get("closing_score"),
        overall: row.get("overall"),
        rationale: row.get("rationale"),
        raw_model_output: row.get("raw_model_output"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

/// Persist a pipeline result for a transcript
pub async fn create(db: &SqlitePool, transcript_id: &str, result: &AnalysisResult) -> Result<Score> {
    let score = Score {
        id: uuid_utils::generate_key(),
        transcript_id: transcript_id.to_string(),
        pitch_score: result.pitch_score,
        conversion_score: result.conversion_score,
        rapport_score: result.rapport_score,
        objection_score: result.objection_score,
        closing_score: result.closing_score,
        overall: result.overall,
        rationale: result.rationale.clone(),
        raw_model_output: result.raw_model_output.clone(),
        created_at: time::now(),
    };

    sqlx::query(&format!(
        "INSERT INTO scores ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        SCORE_COLUMNS
    ))
    .bind(&score.id)
    .bind(&score.transcript_id)
    .bind(score.pitch_score)
    .bind(score.conversion_score)
    .bind(score.rapport_score)
    .bind(score.objection_score)
    .bind(score.closing_score)
    .bind(score.overall)
    .bind(&score.rationale)
    .bind(&score.raw_model_output)
    .bind(time::to_storage(score.created_at))
    .execute(db)
    .await?;

    Ok(score)
}

/// Latest score stored for a transcript
pub async fn find_by_transcript(db: &SqlitePool, transcript_id: &str) -> Result<Option<Score>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM scores WHERE transcript_guid = ?
         ORDER BY created_at DESC, rowid DESC LIMIT 1",
        SCORE_COLUMNS
    ))
    .bind(transcript_id)
    .fetch_optional(db)
    .await?;

    row.as_ref().map(from_row).transpose()
}
