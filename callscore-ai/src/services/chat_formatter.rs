//! Grounding context and conversation rendering for analytics chat
//!
//! The caller-supplied context is arbitrary JSON (normally an
//! [`AggregatedAnalytics`](super::score_aggregator::AggregatedAnalytics)
//! echoed back by the client). It is compacted to a bounded shape so the
//! prompt size does not grow with history.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

/// Leading radar entries kept
pub const RADAR_LIMIT: usize = 10;

/// Trailing trend entries kept
pub const TREND_LIMIT: usize = 12;

/// Trailing bar entries kept
pub const BAR_LIMIT: usize = 5;

/// Per-message character cap after whitespace collapsing
pub const MAX_MESSAGE_CHARS: usize = 4000;

const CHAT_INSTRUCTION: &str = "You are an assistant helping analyze meeting analytics. \
Use the provided analytics context only; if unsure, say so. \
Provide concise, actionable, and accurate answers grounded in the numbers.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// One prior message of the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    /// Lenient read of one message: only `"assistant"` is the assistant,
    /// non-string content is empty
    pub fn from_value(value: &Value) -> Self {
        let role = match value.get("role").and_then(Value::as_str) {
            Some("assistant") => ChatRole::Assistant,
            _ => ChatRole::User,
        };
        let content = value
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { role, content }
    }
}

/// Read the `messages` field; anything other than an array is no history
pub fn turns_from_value(messages: Option<&Value>) -> Vec<ChatTurn> {
    match messages {
        Some(Value::Array(items)) => items.iter().map(ChatTurn::from_value).collect(),
        _ => Vec::new(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroundingContext<'a> {
    latest_score: &'a Value,
    avg_last_k: &'a Value,
    radar_series: &'a [Value],
    trend_series: &'a [Value],
    bar_series: &'a [Value],
}

fn head(value: Option<&Value>, n: usize) -> &[Value] {
    match value.and_then(Value::as_array) {
        Some(items) => &items[..items.len().min(n)],
        None => &[],
    }
}

fn tail(value: Option<&Value>, n: usize) -> &[Value] {
    match value.and_then(Value::as_array) {
        Some(items) => &items[items.len().saturating_sub(n)..],
        None => &[],
    }
}

fn present(value: Option<&Value>) -> &Value {
    static NULL: Value = Value::Null;
    value.unwrap_or(&NULL)
}

/// Compact an analytics context into a bounded JSON string
///
/// Keeps only `latest.score.overall`, `avgLastK`, the first 10 radar
/// entries, the last 12 trend entries and the last 5 bar entries.
pub fn format_context(context: &Value) -> String {
    let compact = GroundingContext {
        latest_score: present(context.pointer("/latest/score/overall")),
        avg_last_k: present(context.get("avgLastK")),
        radar_series: head(context.get("radarSeries"), RADAR_LIMIT),
        trend_series: tail(context.get("trendSeries"), TREND_LIMIT),
        bar_series: tail(context.get("barSeries"), BAR_LIMIT),
    };

    // Serializing borrowed JSON cannot fail; the fallbacks mirror the
    // documented contract (original context, then `{}`)
    serde_json::to_string(&compact)
        .or_else(|e| {
            warn!(error = %e, "Failed to serialize compact chat context; using original");
            serde_json::to_string(context)
        })
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to serialize chat context");
            json!({}).to_string()
        })
}

/// Collapse every whitespace run to one space and cap the length
pub fn sanitize(content: &str) -> String {
    let mut out = String::with_capacity(content.len().min(MAX_MESSAGE_CHARS));
    let mut in_space = false;
    let mut count = 0;

    for ch in content.chars() {
        if count == MAX_MESSAGE_CHARS {
            break;
        }
        if ch.is_whitespace() {
            if in_space {
                continue;
            }
            in_space = true;
            out.push(' ');
        } else {
            in_space = false;
            out.push(ch);
        }
        count += 1;
    }

    out
}

/// `User: ...` / `Assistant: ...` lines, one per turn
pub fn render_turns(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), sanitize(&turn.content)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full chat prompt: instruction, grounded context, conversation, open turn
pub fn build_chat_prompt(context: &Value, turns: &[ChatTurn]) -> String {
    format!(
        "{}\n\nAnalytics Context (JSON):\n{}\n\nConversation so far:\n{}\n\nAssistant:",
        CHAT_INSTRUCTION,
        format_context(context),
        render_turns(turns)
    )
}
