//! Repository layer for callscore-ai
//!
//! Free async functions over a `SqlitePool`, one module per table. Rows are
//! mapped by hand with `sqlx::Row`.

pub mod history;
pub mod meetings;
pub mod organizations;
pub mod scores;
pub mod sessions;
pub mod settings;
pub mod transcripts;
pub mod users;

use callscore_common::{time, Error, Result};
use chrono::{DateTime, Utc};

/// Parse a stored `created_at` column
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    time::from_storage(raw).ok_or_else(|| Error::Internal(format!("Invalid stored timestamp: {}", raw)))
}
