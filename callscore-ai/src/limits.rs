//! History window sizes for retrieval endpoints

/// Upper bound on transcripts returned by any history query
pub const MAX_HISTORY: u32 = 10;

/// Default window for `GET /api/transcripts`
pub const DEFAULT_TRANSCRIPT_LIMIT: u32 = 5;

/// Default window for `GET /api/meetings/:id/analytics`
pub const DEFAULT_ANALYTICS_LIMIT: u32 = 8;

/// Meetings listed by `GET /api/meetings`
pub const RECENT_MEETINGS: u32 = 20;

/// Resolve a `limit` query parameter
///
/// Absent or unparseable values use `default`; the result is clamped to
/// `[1, MAX_HISTORY]`.
///
/// # Examples
/// ```
/// use callscore_ai::limits::resolve_limit;
///
/// assert_eq!(resolve_limit(None, 5), 5);
/// assert_eq!(resolve_limit(Some("7"), 5), 7);
/// assert_eq!(resolve_limit(Some("50"), 5), 10);
/// assert_eq!(resolve_limit(Some("lots"), 5), 5);
/// assert_eq!(resolve_limit(Some("0"), 5), 1);
/// ```
pub fn resolve_limit(raw: Option<&str>, default: u32) -> u32 {
    let requested = raw
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(default as i64);

    requested.clamp(1, MAX_HISTORY as i64) as u32
}
