//! Shared fixtures for callscore-ai integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use callscore_ai::services::{ModelClient, ModelError};
use callscore_ai::{build_router, AppState};
use callscore_common::db::init::connect_in_memory;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

// =============================================================================
// Canned model client
// =============================================================================

/// Model double that replays queued replies and records prompts
pub struct CannedModel {
    configured: bool,
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedModel {
    pub fn replying(replies: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            configured: false,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for CannedModel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        if !self.configured {
            return Err(ModelError::Unavailable);
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::EmptyResponse))
    }
}

/// A well-formed analysis reply wrapped in prose
pub fn analysis_reply(overall: u32) -> Result<String, ModelError> {
    Ok(format!(
        "Here is the analysis:\n{}",
        json!({
            "pitchScore": overall + 1,
            "conversionScore": overall + 2,
            "rapportScore": overall + 3,
            "objectionScore": overall + 4,
            "closingScore": overall + 5,
            "overall": overall,
            "rationale": "Clear agenda, weak close."
        })
    ))
}

// =============================================================================
// App and requests
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

pub async fn test_app(model: Arc<dyn ModelClient>) -> TestApp {
    let db = connect_in_memory().await.expect("in-memory database");
    let router = build_router(AppState::new(db.clone(), model));
    TestApp { router, db }
}

impl TestApp {
    /// Send a request; returns status and JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_raw(method, uri, token, body.map(|body| body.to_string()))
            .await
    }

    /// Like [`send`](Self::send) but with the body text taken verbatim
    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn signup(&self, email: &str, org: &str, role: Option<&str>) -> (StatusCode, Value) {
        let mut body = json!({
            "email": email,
            "password": "correct horse",
            "displayName": "Test User",
            "orgName": org,
        });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        self.send("POST", "/api/auth/signup", None, Some(body)).await
    }

    /// Sign up and log in; returns the bearer token
    pub async fn login_new_user(&self, email: &str, org: &str) -> String {
        let (status, _) = self.signup(email, org, None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": "correct horse"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

// =============================================================================
// Stub model provider over HTTP
// =============================================================================

/// Local stand-in for the provider's `generateContent` endpoint
///
/// Each API version answers with a fixed status and body; every hit is
/// recorded as `(version, model_action, query key)`.
pub struct StubProvider {
    pub addr: SocketAddr,
    pub hits: Arc<Mutex<Vec<(String, String, Option<String>)>>>,
}

#[derive(Clone)]
struct StubState {
    responses: Arc<HashMap<String, (StatusCode, Value)>>,
    hits: Arc<Mutex<Vec<(String, String, Option<String>)>>>,
}

async fn stub_generate(
    State(state): State<StubState>,
    Path((version, model_action)): Path<(String, String)>,
    axum::extract::Query(query): axum::extract::Query<HashMap<String, String>>,
    Json(_body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state
        .hits
        .lock()
        .unwrap()
        .push((version.clone(), model_action, query.get("key").cloned()));

    state
        .responses
        .get(&version)
        .map(|(status, body)| (*status, Json(body.clone())))
        .unwrap_or((StatusCode::NOT_FOUND, Json(json!({"error": "unknown version"}))))
}

impl StubProvider {
    pub async fn start(responses: Vec<(&str, StatusCode, Value)>) -> Self {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            responses: Arc::new(
                responses
                    .into_iter()
                    .map(|(version, status, body)| (version.to_string(), (status, body)))
                    .collect(),
            ),
            hits: hits.clone(),
        };

        let app = Router::new()
            .route("/:version/models/:model_action", post(stub_generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn versions_hit(&self) -> Vec<String> {
        self.hits.lock().unwrap().iter().map(|h| h.0.clone()).collect()
    }
}

/// Provider envelope carrying `text`
pub fn envelope(text: &str) -> Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
}
