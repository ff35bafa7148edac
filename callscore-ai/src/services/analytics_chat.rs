//! Analytics Q&A against the model
//!
//! Unlike transcript analysis, upstream failures here propagate to the
//! caller. A missing credential still answers with an explanatory reply.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::chat_formatter::{build_chat_prompt, ChatTurn};
use super::model_client::{CallOutcome, FailurePolicy, ModelClient, ModelError};

const CHAT_FAILURE_POLICY: FailurePolicy = FailurePolicy::SurfaceUpstream;

/// Reply sent when no model credential is configured
pub const NOT_CONFIGURED_REPLY: &str =
    "The model is not configured. Please set CALLSCORE_MODEL_API_KEY.";

#[derive(Clone)]
pub struct AnalyticsChat {
    client: Arc<dyn ModelClient>,
}

impl AnalyticsChat {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Answer the latest turn using the grounded analytics context
    pub async fn reply(&self, context: &Value, turns: &[ChatTurn]) -> Result<String, ModelError> {
        let prompt = build_chat_prompt(context, turns);
        debug!(turns = turns.len(), prompt_bytes = prompt.len(), "Sending analytics chat prompt");

        match CHAT_FAILURE_POLICY.apply(self.client.invoke(&prompt).await) {
            Ok(CallOutcome::Completed(reply)) => Ok(reply),
            Ok(CallOutcome::Degraded(err)) => {
                warn!(reason = %err, "Analytics chat unavailable");
                Ok(NOT_CONFIGURED_REPLY.to_string())
            }
            Err(err) => {
                warn!(reason = %err, "Analytics chat model call failed");
                Err(err)
            }
        }
    }
}
