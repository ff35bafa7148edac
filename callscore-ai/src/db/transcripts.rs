//! Transcript records

use callscore_common::db::Transcript;
use callscore_common::{time, uuid_utils, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::parse_timestamp;

const TRANSCRIPT_COLUMNS: &str = "guid, meeting_guid, text, processed, created_at";

fn from_row(row: &SqliteRow) -> Result<Transcript> {
    Ok(Transcript {
        id: row.get("guid"),
        meeting_id: row.get("meeting_guid"),
        text: row.get("text"),
        processed: row.get::<i64, _>("processed") != 0,
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

/// Store a new, not yet processed transcript
pub async fn create(db: &SqlitePool, meeting_id: &str, text: &str) -> Result<Transcript> {
    let transcript = Transcript {
        id: uuid_utils::generate_key(),
        meeting_id: meeting_id.to_string(),
        text: text.to_string(),
        processed: false,
        created_at: time::now(),
    };

    sqlx::query(&format!(
        "INSERT INTO transcripts ({}) VALUES (?, ?, ?, 0, ?)",
        TRANSCRIPT_COLUMNS
    ))
    .bind(&transcript.id)
    .bind(&transcript.meeting_id)
    .bind(&transcript.text)
    .bind(time::to_storage(transcript.created_at))
    .execute(db)
    .await?;

    Ok(transcript)
}

pub async fn mark_processed(db: &SqlitePool, transcript_id: &str) -> Result<()> {
    sqlx::query("UPDATE transcripts SET processed = 1 WHERE guid = ?")
        .bind(transcript_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Up to `limit` transcripts of a meeting, newest first
pub async fn recent_for_meeting(db: &SqlitePool, meeting_id: &str, limit: u32) -> Result<Vec<Transcript>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM transcripts WHERE meeting_guid = ?
         ORDER BY created_at DESC, rowid DESC LIMIT ?",
        TRANSCRIPT_COLUMNS
    ))
    .bind(meeting_id)
    .bind(limit as i64)
    .fetch_all(db)
    .await?;

    rows.iter().map(from_row).collect()
}
