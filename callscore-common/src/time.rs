//! Timestamp utilities

use chrono::{DateTime, Local, SecondsFormat, SubsecRound, Utc};

/// Get current UTC timestamp, truncated to storage precision
///
/// A record built from `now()` compares equal to the same record read back.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp the way records are stored (RFC 3339, millisecond precision)
///
/// Fixed-width millisecond output keeps lexical order equal to chronological
/// order, which the `ORDER BY created_at DESC` queries rely on.
pub fn to_storage(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp back into UTC
pub fn from_storage(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Local calendar date in `M/D/YYYY` form, used for default meeting names
pub fn local_date_label() -> String {
    Local::now().format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_storage_format_has_millis_and_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(to_storage(ts), "2025-03-04T05:06:07.000Z");
    }

    #[test]
    fn test_storage_roundtrip_preserves_instant() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(from_storage(&to_storage(ts)), Some(ts));
    }

    #[test]
    fn test_storage_order_is_lexical() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(to_storage(earlier) < to_storage(later));
    }

    #[test]
    fn test_from_storage_rejects_garbage() {
        assert!(from_storage("yesterday").is_none());
    }

    #[test]
    fn test_local_date_label_shape() {
        let label = local_date_label();
        let parts: Vec<&str> = label.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 4);
    }
}
