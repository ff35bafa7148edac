//! Meeting records

use callscore_common::db::Meeting;
use callscore_common::{time, uuid_utils, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::parse_timestamp;

const MEETING_COLUMNS: &str = "guid, name, user_guid, org_guid, created_at";

fn from_row(row: &SqliteRow) -> Result<Meeting> {
    Ok(Meeting {
        id: row.get("guid"),
        name: row.get("name"),
        user_id: row.get("user_guid"),
        org_id: row.get("org_guid"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

pub async fn create(db: &SqlitePool, name: &str, user_id: &str, org_id: &str) -> Result<Meeting> {
    let meeting = Meeting {
        id: uuid_utils::generate_key(),
        name: name.to_string(),
        user_id: user_id.to_string(),
        org_id: org_id.to_string(),
        created_at: time::now(),
    };

    sqlx::query(&format!(
        "INSERT INTO meetings ({}) VALUES (?, ?, ?, ?, ?)",
        MEETING_COLUMNS
    ))
    .bind(&meeting.id)
    .bind(&meeting.name)
    .bind(&meeting.user_id)
    .bind(&meeting.org_id)
    .bind(time::to_storage(meeting.created_at))
    .execute(db)
    .await?;

    Ok(meeting)
}

/// Meeting with this id, if it belongs to the organization
pub async fn find_in_org(db: &SqlitePool, meeting_id: &str, org_id: &str) -> Result<Option<Meeting>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM meetings WHERE guid = ? AND org_guid = ?",
        MEETING_COLUMNS
    ))
    .bind(meeting_id)
    .bind(org_id)
    .fetch_optional(db)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Most recently created meeting with this name owned by the user
pub async fn find_by_name_for_user(db: &SqlitePool, name: &str, user_id: &str) -> Result<Option<Meeting>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM meetings WHERE name = ? AND user_guid = ?
         ORDER BY created_at DESC, rowid DESC LIMIT 1",
        MEETING_COLUMNS
    ))
    .bind(name)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    row.as_ref().map(from_row).transpose()
}

/// Find by name for the user, or create it in the user's organization
pub async fn find_or_create(db: &SqlitePool, name: &str, user_id: &str, org_id: &str) -> Result<Meeting> {
    match find_by_name_for_user(db, name, user_id).await? {
        Some(meeting) => Ok(meeting),
        None => create(db, name, user_id, org_id).await,
    }
}

/// The user's meetings, newest first
pub async fn recent_for_user(db: &SqlitePool, user_id: &str, limit: u32) -> Result<Vec<Meeting>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM meetings WHERE user_guid = ?
         ORDER BY created_at DESC, rowid DESC LIMIT ?",
        MEETING_COLUMNS
    ))
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(db)
    .await?;

    rows.iter().map(from_row).collect()
}
