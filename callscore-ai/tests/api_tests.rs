//! HTTP API integration tests
//!
//! Routing, auth, validation and the soft-fail/hard-fail asymmetry between
//! transcript analysis and analytics chat.

mod helpers;

use axum::http::StatusCode;
use callscore_ai::services::analytics_chat::NOT_CONFIGURED_REPLY;
use callscore_ai::services::ModelError;
use helpers::{analysis_reply, test_app, CannedModel};
use serde_json::{json, Value};

// =============================================================================
// Health and auth
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_auth() {
    let app = test_app(CannedModel::unconfigured()).await;
    let (status, body) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "callscore-ai");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_signup_validation_and_conflict() {
    let app = test_app(CannedModel::unconfigured()).await;

    let (status, body) = app
        .send("POST", "/api/auth/signup", None, Some(json!({"email": "a@x.test"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = app.signup("a@x.test", "Acme", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["userId"].is_string());

    let (status, _) = app.signup("a@x.test", "Acme", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.signup("b@x.test", "Acme", Some("superuser")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    for (uri, token) in [
        ("/api/auth/signup", None),
        ("/api/auth/login", None),
        ("/api/transcripts", Some(token.as_str())),
    ] {
        let (status, body) = app
            .send_raw("POST", uri, token, Some("{\"email\": ".to_string()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body["error"]["code"], "BAD_REQUEST", "uri: {}", uri);
        assert!(body["error"]["message"].is_string());
    }
}

#[tokio::test]
async fn test_login_returns_token_and_role() {
    let app = test_app(CannedModel::unconfigured()).await;
    app.signup("admin@x.test", "Acme", Some("admin")).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "admin@x.test", "password": "correct horse"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["token"].as_str().unwrap().len(), 64);

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "admin@x.test", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app(CannedModel::unconfigured()).await;

    for (method, uri) in [
        ("GET", "/api/meetings"),
        ("GET", "/api/transcripts?meetingId=x"),
        ("POST", "/api/transcripts"),
        ("POST", "/api/analytics-chat"),
        ("GET", "/api/meetings/x/analytics"),
    ] {
        let (status, _) = app.send(method, uri, None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);

        let (status, _) = app.send(method, uri, Some("bogus"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} with bad token", method, uri);
    }
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, _) = app.send("POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("GET", "/api/meetings", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Transcript submission
// =============================================================================

#[tokio::test]
async fn test_submit_requires_text() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    for body in [json!({}), json!({"text": ""})] {
        let (status, response) = app
            .send("POST", "/api/transcripts", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["message"], "Text is required");
    }
}

#[tokio::test]
async fn test_submit_scores_and_creates_meeting() {
    let model = CannedModel::replying(vec![analysis_reply(72)]);
    let app = test_app(model.clone()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/transcripts",
            Some(&token),
            Some(json!({"meetingName": "  Acme discovery  ", "text": "Rep: Hi there"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["transcript"]["processed"], true);
    assert_eq!(body["score"]["overall"], json!(72.0));
    assert_eq!(body["score"]["pitchScore"], json!(73.0));
    assert_eq!(body["score"]["transcriptId"], body["transcript"]["id"]);
    assert!(model.prompts.lock().unwrap()[0].contains("Rep: Hi there"));

    let (_, meetings) = app.send("GET", "/api/meetings", Some(&token), None).await;
    assert_eq!(meetings["meetings"][0]["name"], "Acme discovery");
    assert_eq!(meetings["meetings"][0]["id"], body["transcript"]["meetingId"]);
}

#[tokio::test]
async fn test_same_meeting_name_is_reused() {
    let model = CannedModel::replying(vec![analysis_reply(50), analysis_reply(60)]);
    let app = test_app(model).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let mut meeting_ids = Vec::new();
    for text in ["first", "second"] {
        let (_, body) = app
            .send(
                "POST",
                "/api/transcripts",
                Some(&token),
                Some(json!({"meetingName": "Weekly", "text": text})),
            )
            .await;
        meeting_ids.push(body["transcript"]["meetingId"].clone());
    }
    assert_eq!(meeting_ids[0], meeting_ids[1]);

    let (_, meetings) = app.send("GET", "/api/meetings", Some(&token), None).await;
    assert_eq!(meetings["meetings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_default_meeting_name_is_dated() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    app.send("POST", "/api/transcripts", Some(&token), Some(json!({"text": "t"})))
        .await;

    let (_, meetings) = app.send("GET", "/api/meetings", Some(&token), None).await;
    let name = meetings["meetings"][0]["name"].as_str().unwrap();
    assert!(name.starts_with("Meeting on "), "{}", name);
}

#[tokio::test]
async fn test_submit_is_201_with_fallback_when_unconfigured() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, body) = app
        .send("POST", "/api/transcripts", Some(&token), Some(json!({"text": "t"})))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"]["overall"], json!(0.0));
    assert!(!body["score"]["rawModelOutput"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_is_201_with_fallback_on_upstream_error() {
    let model = CannedModel::replying(vec![Err(ModelError::RequestFailed {
        status: 500,
        body: "boom".to_string(),
    })]);
    let app = test_app(model).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, body) = app
        .send("POST", "/api/transcripts", Some(&token), Some(json!({"text": "t"})))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"]["overall"], json!(0.0));
    let raw: Value = serde_json::from_str(body["score"]["rawModelOutput"].as_str().unwrap()).unwrap();
    assert!(raw["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_submit_to_meeting_of_other_org_is_404() {
    let app = test_app(CannedModel::replying(vec![analysis_reply(40)])).await;
    let owner = app.login_new_user("a@x.test", "Acme").await;
    let outsider = app.login_new_user("b@y.test", "Globex").await;

    let (_, body) = app
        .send("POST", "/api/transcripts", Some(&owner), Some(json!({"text": "t"})))
        .await;
    let meeting_id = body["transcript"]["meetingId"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            "POST",
            "/api/transcripts",
            Some(&outsider),
            Some(json!({"meetingId": meeting_id, "text": "t"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Retrieval and analytics
// =============================================================================

async fn seed_meeting(app: &helpers::TestApp, token: &str, count: usize) -> String {
    let mut meeting_id = None;
    for i in 0..count {
        let mut body = json!({"text": format!("transcript {}", i)});
        match &meeting_id {
            Some(id) => body["meetingId"] = json!(id),
            None => body["meetingName"] = json!("Pipeline review"),
        }
        let (status, response) = app.send("POST", "/api/transcripts", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        meeting_id = response["transcript"]["meetingId"].as_str().map(str::to_string);
    }
    meeting_id.unwrap()
}

#[tokio::test]
async fn test_retrieval_requires_meeting_id() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, _) = app.send("GET", "/api/transcripts", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_retrieval_is_newest_first_and_capped() {
    let replies = (0..12).map(|i| analysis_reply(40 + i)).collect();
    let app = test_app(CannedModel::replying(replies)).await;
    let token = app.login_new_user("a@x.test", "Acme").await;
    let meeting_id = seed_meeting(&app, &token, 12).await;

    let uri = format!("/api/transcripts?meetingId={}", meeting_id);
    let (status, body) = app.send("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["transcript"]["text"], "transcript 11");
    assert_eq!(items[0]["score"]["overall"], json!(51.0));
    assert_eq!(items[0]["score"]["transcriptId"], items[0]["transcript"]["id"]);

    let uri = format!("/api/transcripts?meetingId={}&limit=50", meeting_id);
    let (_, body) = app.send("GET", &uri, Some(&token), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 10);

    let uri = format!("/api/transcripts?meetingId={}&limit=abc", meeting_id);
    let (_, body) = app.send("GET", &uri, Some(&token), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_meeting_analytics() {
    let replies = [50, 60, 70, 80, 90].iter().map(|o| analysis_reply(*o)).collect();
    let app = test_app(CannedModel::replying(replies)).await;
    let token = app.login_new_user("a@x.test", "Acme").await;
    let meeting_id = seed_meeting(&app, &token, 5).await;

    let uri = format!("/api/meetings/{}/analytics", meeting_id);
    let (status, body) = app.send("GET", &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latest"]["score"]["overall"], json!(90.0));
    assert_eq!(body["avgLastK"]["overall"], json!(80.0));
    assert_eq!(body["radarSeries"].as_array().unwrap().len(), 5);
    assert_eq!(body["trendSeries"][0], json!({"name": "M1", "score": 50.0}));
    assert_eq!(body["trendSeries"][4], json!({"name": "M5", "score": 90.0}));
    assert_eq!(body["barSeries"][4]["name"], "#1");

    let (status, _) = app
        .send("GET", "/api/meetings/missing/analytics", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Analytics chat
// =============================================================================

#[tokio::test]
async fn test_chat_unconfigured_is_soft() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    // Checked before validation: even an empty body gets the explanatory reply
    let (status, body) = app
        .send("POST", "/api/analytics-chat", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], NOT_CONFIGURED_REPLY);
}

#[tokio::test]
async fn test_chat_unconfigured_ignores_malformed_body() {
    let app = test_app(CannedModel::unconfigured()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, body) = app
        .send_raw("POST", "/api/analytics-chat", Some(&token), Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], NOT_CONFIGURED_REPLY);
}

#[tokio::test]
async fn test_chat_malformed_body_is_bad_request_when_configured() {
    let model = CannedModel::replying(vec![]);
    let app = test_app(model.clone()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, body) = app
        .send_raw("POST", "/api/analytics-chat", Some(&token), Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_chat_requires_meeting_and_context() {
    let app = test_app(CannedModel::replying(vec![])).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    for body in [json!({"meetingId": "m"}), json!({"context": {}}), json!({"meetingId": "", "context": {}})] {
        let (status, _) = app
            .send("POST", "/api/analytics-chat", Some(&token), Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
    }
}

#[tokio::test]
async fn test_chat_reply_is_grounded() {
    let model = CannedModel::replying(vec![Ok("Closing is your weakest area.".to_string())]);
    let app = test_app(model.clone()).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let trend: Vec<Value> = (1..=20).map(|i| json!({"name": format!("M{}", i), "score": i})).collect();
    let (status, body) = app
        .send(
            "POST",
            "/api/analytics-chat",
            Some(&token),
            Some(json!({
                "meetingId": "m1",
                "context": {"avgLastK": {"overall": 64}, "trendSeries": trend},
                "messages": [{"role": "user", "content": "What  should I\nwork on?"}]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Closing is your weakest area.");

    let prompt = model.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("User: What should I work on?"));
    assert!(prompt.contains(r#""avgLastK":{"overall":64}"#));
    assert!(!prompt.contains(r#""name":"M8""#));
    assert!(prompt.contains(r#""name":"M9""#));
    assert!(prompt.trim_end().ends_with("Assistant:"));
}

#[tokio::test]
async fn test_chat_upstream_failure_is_500() {
    let model = CannedModel::replying(vec![Err(ModelError::RequestFailed {
        status: 429,
        body: "quota exceeded".to_string(),
    })]);
    let app = test_app(model).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/analytics-chat",
            Some(&token),
            Some(json!({"meetingId": "m1", "context": {}})),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Model request failed: 429 quota exceeded");
}

#[tokio::test]
async fn test_chat_empty_model_reply_is_500() {
    let model = CannedModel::replying(vec![Err(ModelError::EmptyResponse)]);
    let app = test_app(model).await;
    let token = app.login_new_user("a@x.test", "Acme").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/analytics-chat",
            Some(&token),
            Some(json!({"meetingId": "m1", "context": {}})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
