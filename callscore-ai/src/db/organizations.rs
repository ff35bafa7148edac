//! Organization records

use callscore_common::db::Organization;
use callscore_common::{time, uuid_utils, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

use super::parse_timestamp;

fn from_row(row: &SqliteRow) -> Result<Organization> {
    Ok(Organization {
        id: row.get("guid"),
        name: row.get("name"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

pub async fn find_by_name(db: &SqlitePool, name: &str) -> Result<Option<Organization>> {
    let row = sqlx::query("SELECT guid, name, created_at FROM organizations WHERE name = ?")
        .bind(name)
        .fetch_optional(db)
        .await?;

    row.as_ref().map(from_row).transpose()
}

pub async fn create(db: &SqlitePool, name: &str) -> Result<Organization> {
    let org = Organization {
        id: uuid_utils::generate_key(),
        name: name.to_string(),
        created_at: time::now(),
    };

    sqlx::query("INSERT INTO organizations (guid, name, created_at) VALUES (?, ?, ?)")
        .bind(&org.id)
        .bind(&org.name)
        .bind(time::to_storage(org.created_at))
        .execute(db)
        .await?;

    info!(org_id = %org.id, name = %org.name, "Created organization");
    Ok(org)
}

/// Look up an organization by name, creating it when absent
///
/// Not atomic: two concurrent signups for a new name race, and the loser
/// fails on the UNIQUE constraint.
pub async fn find_or_create(db: &SqlitePool, name: &str) -> Result<Organization> {
    match find_by_name(db, name).await? {
        Some(org) => Ok(org),
        None => create(db, name).await,
    }
}
