//! Tolerant JSON recovery from model output
//!
//! Model replies are supposed to be a bare JSON object but often arrive
//! wrapped in prose or code fences. [`extract`] tries the whole text first,
//! then the span from the first `{` to the last `}`.
//!
//! Known boundary cases of the span heuristic:
//! - Two separate objects in one reply produce a span covering both plus the
//!   text between them, which usually fails to parse.
//! - A stray `}` in trailing prose (or a `{` in leading prose) widens the
//!   span past the real object.
//!
//! Callers must treat a parseable but structurally wrong value as a possible
//! false positive.

use serde_json::Value;
use tracing::debug;

/// Recover the JSON value contained in `raw`
///
/// Returns `None` when neither the full text nor the brace span parses, or
/// when the text parses to JSON `null`.
pub fn extract(raw: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => non_null(value),
        Err(full_err) => {
            let span = brace_span(raw);
            match span {
                Some(block) => match serde_json::from_str::<Value>(block) {
                    Ok(value) => non_null(value),
                    Err(e) => {
                        debug!(error = %e, "Failed to parse extracted JSON block");
                        None
                    }
                },
                None => {
                    debug!(error = %full_err, "No JSON block found in model output");
                    None
                }
            }
        }
    }
}

/// Slice from the first `{` to the last `}` inclusive, if they are ordered
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

fn non_null(value: Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}
