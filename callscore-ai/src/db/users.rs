//! User accounts and credentials

use callscore_common::api::{PasswordHash, Role};
use callscore_common::db::User;
use callscore_common::{time, uuid_utils, Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::parse_timestamp;

const USER_COLUMNS: &str =
    "guid, email, password_hash, password_salt, display_name, role, org_guid, created_at";

fn from_row(row: &SqliteRow) -> Result<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("guid"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        role: role
            .parse::<Role>()
            .map_err(|e| Error::Internal(format!("Stored role is invalid: {}", e)))?,
        org_id: row.get("org_guid"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

/// New account fields
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a PasswordHash,
    pub display_name: &'a str,
    pub role: Role,
    pub org_id: &'a str,
}

pub async fn create(db: &SqlitePool, new_user: NewUser<'_>) -> Result<User> {
    let user = User {
        id: uuid_utils::generate_key(),
        email: new_user.email.to_string(),
        display_name: new_user.display_name.to_string(),
        role: new_user.role,
        org_id: new_user.org_id.to_string(),
        created_at: time::now(),
    };

    sqlx::query(&format!(
        "INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        USER_COLUMNS
    ))
    .bind(&user.id)
    .bind(&user.email)
    .bind(&new_user.password.hash)
    .bind(&new_user.password.salt)
    .bind(&user.display_name)
    .bind(user.role.as_str())
    .bind(&user.org_id)
    .bind(time::to_storage(user.created_at))
    .execute(db)
    .await?;

    Ok(user)
}

pub async fn email_exists(db: &SqlitePool, email: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

/// User and stored password hash, for login
pub async fn find_with_credentials(
    db: &SqlitePool,
    email: &str,
) -> Result<Option<(User, PasswordHash)>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email)
        .fetch_optional(db)
        .await?;

    match row {
        Some(row) => {
            let hash = PasswordHash {
                hash: row.get("password_hash"),
                salt: row.get("password_salt"),
            };
            Ok(Some((from_row(&row)?, hash)))
        }
        None => Ok(None),
    }
}

pub async fn get(db: &SqlitePool, user_id: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE guid = ?", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    row.as_ref().map(from_row).transpose()
}
