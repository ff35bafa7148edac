//! Model configuration resolution for callscore-ai
//!
//! The model credential is resolved once at startup into a typed
//! [`ModelConfig`]. Absence is the explicit `ModelCredentials::Unconfigured`
//! variant, not an error: every consumer degrades on it.
//!
//! **API key priority:** Database → ENV → TOML

use callscore_common::config::TomlConfig;
use callscore_common::Result;
use sqlx::SqlitePool;
use std::fmt;
use tracing::{info, warn};

/// Default model name
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Default provider host
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables checked for the API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["CALLSCORE_MODEL_API_KEY", "GEMINI_API_KEY"];

/// Environment variables checked for the model name, in order
pub const MODEL_ENV_VARS: [&str; 2] = ["CALLSCORE_MODEL", "GEMINI_MODEL"];

/// Environment variable overriding the provider host
pub const BASE_URL_ENV_VAR: &str = "CALLSCORE_MODEL_BASE_URL";

/// Credential state of the model client
#[derive(Clone, PartialEq, Eq)]
pub enum ModelCredentials {
    Unconfigured,
    ApiKey(String),
}

impl fmt::Debug for ModelCredentials {
    // Never print the key itself
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelCredentials::Unconfigured => f.write_str("Unconfigured"),
            ModelCredentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// Everything the model client needs to reach the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub credentials: ModelCredentials,
    pub model: String,
    pub base_url: String,
}

impl ModelConfig {
    pub fn unconfigured() -> Self {
        Self {
            credentials: ModelCredentials::Unconfigured,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            credentials: ModelCredentials::ApiKey(api_key.into()),
            ..Self::unconfigured()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.credentials, ModelCredentials::ApiKey(_))
    }
}

/// Validate key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| is_valid_key(value))
}

/// Resolve the full model configuration from database, environment and TOML
pub async fn resolve_model_config(db: &SqlitePool, toml: &TomlConfig) -> Result<ModelConfig> {
    let db_key = crate::db::settings::get_model_api_key(db)
        .await?
        .filter(|k| is_valid_key(k));
    let env_key = first_env(&API_KEY_ENV_VARS);
    let toml_key = toml.model.api_key.clone().filter(|k| is_valid_key(k));

    let sources: Vec<&str> = [
        db_key.as_ref().map(|_| "database"),
        env_key.as_ref().map(|_| "environment"),
        toml_key.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        warn!(
            "Model API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    let credentials = match db_key.or(env_key).or(toml_key) {
        Some(key) => {
            info!("Model API key loaded from {}", sources[0]);
            ModelCredentials::ApiKey(key.trim().to_string())
        }
        None => {
            warn!(
                "Model API key not configured; analysis will return fallback scores. \
                 Set {} or [model] api_key in callscore.toml",
                API_KEY_ENV_VARS[0]
            );
            ModelCredentials::Unconfigured
        }
    };

    let model = first_env(&MODEL_ENV_VARS)
        .or_else(|| toml.model.model.clone().filter(|m| is_valid_key(m)))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let base_url = first_env(&[BASE_URL_ENV_VAR])
        .or_else(|| toml.model.base_url.clone().filter(|u| is_valid_key(u)))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(ModelConfig {
        credentials,
        model,
        base_url: base_url.trim_end_matches('/').to_string(),
    })
}
