//! Transcript analysis pipeline
//!
//! prompt → model → JSON extraction → [`AnalysisResult`]
//!
//! [`AnalysisPipeline::analyze`] never fails. Every failure (missing
//! credential, upstream error, unparseable reply) degrades to the fixed
//! fallback result so that transcript submission always completes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::json_extractor;
use super::model_client::{CallOutcome, FailurePolicy, ModelClient, ModelError};
use super::prompt_builder::build_analysis_prompt;

/// Failures on the analysis path are absorbed into the fallback result
const ANALYSIS_FAILURE_POLICY: FailurePolicy = FailurePolicy::DegradeToFallback;

/// Rationale attached to every fallback result
pub const FALLBACK_RATIONALE: &str =
    "Model analysis failed or is not configured. This is a fallback score.";

/// Pipeline output for one transcript
///
/// Scores are passed through from the model as-is: no range check, no
/// defaulting of missing keys, and `overall` is not recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub pitch_score: Option<f64>,
    pub conversion_score: Option<f64>,
    pub rapport_score: Option<f64>,
    pub objection_score: Option<f64>,
    pub closing_score: Option<f64>,
    pub overall: Option<f64>,
    pub rationale: Option<String>,
    /// Original model text, or a serialized diagnostic on fallback
    pub raw_model_output: String,
}

/// Why a model-derived result could not be produced
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Failed to parse JSON from model output")]
    ExtractionFailed,
}

impl AnalysisResult {
    /// The fixed zero-valued result with the given diagnostic text
    pub fn fallback(raw_model_output: String) -> Self {
        Self {
            pitch_score: Some(0.0),
            conversion_score: Some(0.0),
            rapport_score: Some(0.0),
            objection_score: Some(0.0),
            closing_score: Some(0.0),
            overall: Some(0.0),
            rationale: Some(FALLBACK_RATIONALE.to_string()),
            raw_model_output,
        }
    }

    /// Fallback used when no credential is configured; the diagnostic is the
    /// fallback's own serialization
    pub fn unconfigured_fallback() -> Self {
        let own = json!({
            "pitchScore": 0,
            "conversionScore": 0,
            "rapportScore": 0,
            "objectionScore": 0,
            "closingScore": 0,
            "overall": 0,
            "rationale": FALLBACK_RATIONALE,
        });
        Self::fallback(own.to_string())
    }

    /// Fallback carrying `{"error": message}`
    pub fn error_fallback(message: &str) -> Self {
        Self::fallback(json!({ "error": message }).to_string())
    }

    /// Build a result from an extracted object, trusting whatever keys exist
    fn from_extracted(fields: &Map<String, Value>, raw_model_output: String) -> Self {
        let number = |key: &str| fields.get(key).and_then(lenient_number);

        Self {
            pitch_score: number("pitchScore"),
            conversion_score: number("conversionScore"),
            rapport_score: number("rapportScore"),
            objection_score: number("objectionScore"),
            closing_score: number("closingScore"),
            overall: number("overall"),
            rationale: fields.get("rationale").and_then(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
            raw_model_output,
        }
    }
}

/// Numbers and numeric strings ("85") are accepted; anything else is absent
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Orchestrates one analysis per call; holds no per-request state
#[derive(Clone)]
pub struct AnalysisPipeline {
    client: Arc<dyn ModelClient>,
}

impl AnalysisPipeline {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Score a transcript. Total: failures become the fallback result.
    pub async fn analyze(&self, transcript_text: &str) -> AnalysisResult {
        let outcome = ANALYSIS_FAILURE_POLICY.apply(self.invoke(transcript_text).await);

        match outcome {
            Ok(CallOutcome::Completed(Ok(result))) => result,
            Ok(CallOutcome::Completed(Err(AnalysisFailure::ExtractionFailed))) => {
                warn!("Model output contained no JSON object; using fallback score");
                AnalysisResult::error_fallback(
                    &AnalysisFailure::ExtractionFailed.to_string(),
                )
            }
            Ok(CallOutcome::Completed(Err(AnalysisFailure::Model(err))))
            | Ok(CallOutcome::Degraded(err))
            | Err(err) => self.degrade(err),
        }
    }

    async fn invoke(
        &self,
        transcript_text: &str,
    ) -> Result<Result<AnalysisResult, AnalysisFailure>, ModelError> {
        let prompt = build_analysis_prompt(transcript_text);
        let raw = self.client.invoke(&prompt).await?;
        debug!(bytes = raw.len(), "Model returned analysis text");
        Ok(interpret(raw))
    }

    fn degrade(&self, err: ModelError) -> AnalysisResult {
        match err {
            ModelError::Unavailable => {
                warn!("Model API key is not set; returning fallback scores");
                AnalysisResult::unconfigured_fallback()
            }
            ModelError::RequestFailed { status, ref body } => {
                warn!(status, body = %body, "Model request failed; using fallback score");
                AnalysisResult::error_fallback(&format!(
                    "Model API request failed with status {}",
                    status
                ))
            }
            other => {
                warn!(reason = %other, "Model call failed; using fallback score");
                AnalysisResult::error_fallback(&other.to_string())
            }
        }
    }
}

/// Turn raw model text into a result, or report that nothing was extracted
///
/// Any extracted value is trusted. A non-object value carries no scores but
/// still keeps the model text.
fn interpret(raw: String) -> Result<AnalysisResult, AnalysisFailure> {
    match json_extractor::extract(&raw) {
        Some(Value::Object(fields)) => Ok(AnalysisResult::from_extracted(&fields, raw)),
        Some(other) => {
            debug!(kind = json_kind(&other), "Model returned JSON that is not an object");
            Ok(AnalysisResult::from_extracted(&Map::new(), raw))
        }
        None => Err(AnalysisFailure::ExtractionFailed),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
