//! Generative model client
//!
//! [`ModelClient`] is the capability the pipeline and the chat service call.
//! [`GeminiClient`] is the production implementation; tests substitute a
//! canned double.
//!
//! Request protocol:
//! 1. POST `{base}/v1beta/models/{model}:generateContent?key={key}`
//! 2. On exactly HTTP 404, repeat once against `v1beta2` with the same body
//! 3. Any other non-2xx status fails immediately; there is no backoff
//!
//! The HTTP client keeps reqwest's default (unbounded) timeout.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ModelConfig, ModelCredentials};

const USER_AGENT: &str = concat!("callscore-ai/", env!("CARGO_PKG_VERSION"));

/// Model client errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// No API key configured. A policy state, never retried.
    #[error("Model is not configured (no API key)")]
    Unavailable,

    /// Non-2xx response after the version fallback
    #[error("{status} {body}")]
    RequestFailed { status: u16, body: String },

    /// 2xx response without text in any known field
    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Text-in, text-out access to a generative model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Whether a credential is present (calls will not fail with `Unavailable`)
    fn is_configured(&self) -> bool;

    /// Send one prompt and return the raw text payload of the reply
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError>;
}

// ============================================================================
// Failure policy
// ============================================================================

/// How a call site treats a failed model call
///
/// A missing credential degrades under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Every failure becomes a degraded outcome
    DegradeToFallback,
    /// Upstream failures propagate to the caller
    SurfaceUpstream,
}

/// Result of a model call after the call site's policy was applied
#[derive(Debug)]
pub enum CallOutcome<T> {
    Completed(T),
    Degraded(ModelError),
}

impl FailurePolicy {
    pub fn apply<T>(self, result: Result<T, ModelError>) -> Result<CallOutcome<T>, ModelError> {
        match result {
            Ok(value) => Ok(CallOutcome::Completed(value)),
            Err(ModelError::Unavailable) => Ok(CallOutcome::Degraded(ModelError::Unavailable)),
            Err(err) => match self {
                FailurePolicy::DegradeToFallback => Ok(CallOutcome::Degraded(err)),
                FailurePolicy::SurfaceUpstream => Err(err),
            },
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// API version segment of the endpoint path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    Primary,
    Fallback,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::Primary => "v1beta",
            ApiVersion::Fallback => "v1beta2",
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        }
    }
}

/// Pull the text payload out of a `generateContent` response envelope
///
/// Looks at `candidates[0].content.parts[0]` and takes the first non-empty
/// string among `text`, `inlineData.data` and `stringValue`, in that order.
pub fn extract_payload_text(envelope: &Value) -> Option<String> {
    let part = envelope.pointer("/candidates/0/content/parts/0")?;

    [
        part.get("text"),
        part.pointer("/inlineData/data"),
        part.get("stringValue"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .find(|s| !s.is_empty())
    .map(str::to_string)
}

// ============================================================================
// Gemini client
// ============================================================================

/// `generateContent` client for the Gemini API
pub struct GeminiClient {
    http_client: reqwest::Client,
    config: ModelConfig,
}

impl GeminiClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn endpoint(&self, version: ApiVersion) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.config.base_url,
            version.as_str(),
            self.config.model
        )
    }

    async fn post(
        &self,
        version: ApiVersion,
        api_key: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<reqwest::Response, ModelError> {
        debug!(version = version.as_str(), model = %self.config.model, "Calling model API");

        self.http_client
            .post(self.endpoint(version))
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        let api_key = match &self.config.credentials {
            ModelCredentials::Unconfigured => return Err(ModelError::Unavailable),
            ModelCredentials::ApiKey(key) => key.as_str(),
        };

        let body = GenerateContentRequest::from_prompt(prompt);

        let mut response = self.post(ApiVersion::Primary, api_key, &body).await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!(
                model = %self.config.model,
                "Model endpoint returned 404 on {}, retrying on {}",
                ApiVersion::Primary.as_str(),
                ApiVersion::Fallback.as_str()
            );
            response = self.post(ApiVersion::Fallback, api_key, &body).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        extract_payload_text(&envelope).ok_or(ModelError::EmptyResponse)
    }
}
