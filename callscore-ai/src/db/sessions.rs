//! Bearer session tokens

use callscore_common::api::{generate_session_token, Role};
use callscore_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};

/// Identity attached to a live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub org_id: String,
    pub role: Role,
}

/// Issue a new token for a user
pub async fn create(db: &SqlitePool, user_id: &str) -> Result<String> {
    let token = generate_session_token();

    sqlx::query("INSERT INTO sessions (token, user_guid, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(time::to_storage(time::now()))
        .execute(db)
        .await?;

    Ok(token)
}

/// Resolve a token to the owning user's identity
pub async fn find_identity(db: &SqlitePool, token: &str) -> Result<Option<SessionIdentity>> {
    let row = sqlx::query(
        r#"
        SELECT u.guid, u.org_guid, u.role
        FROM sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    row.map(|row| -> Result<SessionIdentity> {
        let role: String = row.get("role");
        Ok(SessionIdentity {
            user_id: row.get("guid"),
            org_id: row.get("org_guid"),
            role: role.parse::<Role>().map_err(Error::Internal)?,
        })
    })
    .transpose()
}

/// Remove a token; returns whether it existed
pub async fn delete(db: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
