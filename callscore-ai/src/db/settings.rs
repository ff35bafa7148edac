//! Settings table access
//!
//! Key-value rows; values are stored as text and parsed on read.

use callscore_common::{Error, Result};
use sqlx::SqlitePool;

const MODEL_API_KEY: &str = "model_api_key";

/// Model API key stored in the database, if any
pub async fn get_model_api_key(db: &SqlitePool) -> Result<Option<String>> {
    get_setting::<String>(db, MODEL_API_KEY).await
}

pub async fn set_model_api_key(db: &SqlitePool, key: &str) -> Result<()> {
    set_setting(db, MODEL_API_KEY, key).await
}

/// Generic setting getter
pub async fn get_setting<T>(db: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match value.flatten() {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for setting '{}': {}", key, e))),
        None => Ok(None),
    }
}

/// Generic setting setter (upsert)
pub async fn set_setting<T>(db: &SqlitePool, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}
