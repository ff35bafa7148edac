//! callscore-ai library - transcript scoring and analytics service
//!
//! Scores sales-meeting transcripts with a generative model, stores the
//! results, and serves rolling analytics plus a grounded Q&A endpoint.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod limits;
pub mod services;

pub use error::{ApiError, ApiResult};

use services::{AnalysisPipeline, AnalyticsChat, ModelClient};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Soft-fail transcript analysis
    pub pipeline: AnalysisPipeline,
    /// Hard-fail analytics chat
    pub chat: AnalyticsChat,
}

impl AppState {
    /// Both services share one model client
    pub fn new(db: SqlitePool, model: Arc<dyn ModelClient>) -> Self {
        Self {
            db,
            pipeline: AnalysisPipeline::new(model.clone()),
            chat: AnalyticsChat::new(model),
        }
    }
}

/// Build application router
///
/// `/health`, signup and login are public; everything else needs a
/// bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/auth/logout", post(api::logout))
        .route("/api/meetings", get(api::list_meetings))
        .route("/api/meetings/:id/analytics", get(api::meeting_analytics))
        .route(
            "/api/transcripts",
            get(api::list_transcripts).post(api::submit_transcript),
        )
        .route("/api/analytics-chat", post(api::analytics_chat))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/auth/signup", post(api::signup))
        .route("/api/auth/login", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
}
