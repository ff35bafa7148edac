//! Analysis and chat services

pub mod analysis_pipeline;
pub mod analytics_chat;
pub mod chat_formatter;
pub mod json_extractor;
pub mod model_client;
pub mod overall_formula;
pub mod prompt_builder;
pub mod score_aggregator;

pub use analysis_pipeline::{AnalysisPipeline, AnalysisResult};
pub use analytics_chat::AnalyticsChat;
pub use model_client::{GeminiClient, ModelClient, ModelError};
pub use score_aggregator::{aggregate, AggregatedAnalytics};
