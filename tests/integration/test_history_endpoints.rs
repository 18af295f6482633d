//! Integration tests for the diagram history endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use diagram_studio_api::models::{Analysis, HistoryItem};
use diagram_studio_api::routes::app_state::MAX_TRACKED_USERS;
use diagram_studio_api::routes::{AppState, create_api_router};
use diagram_studio_api::services::llm_client::{LlmBackend, LlmError};
use diagram_studio_api::services::session_verifier::SessionVerifier;
use diagram_studio_api::storage::MemoryDiagramStore;

const TEST_SECRET: &str = "test-secret-0123456789abcdef0123456789abcdef";

struct FixedLlm(String);

#[async_trait]
impl LlmBackend for FixedLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

struct TestContext {
    server: TestServer,
    state: AppState,
    token: String,
    other_token: String,
}

fn setup() -> TestContext {
    let verifier = Arc::new(SessionVerifier::new(TEST_SECRET));
    let token = verifier
        .issue("user_123", Duration::minutes(15))
        .expect("token");
    let other_token = verifier
        .issue("user_456", Duration::minutes(15))
        .expect("token");

    let completion = r#"{
        "mermaidCode": "flowchart TD; A-->B;",
        "analysis": {"summary": "A two step flow for testing."}
    }"#;
    let state = AppState::with_collaborators(
        Arc::new(MemoryDiagramStore::new()),
        Arc::new(FixedLlm(completion.to_string())),
        Arc::new(FixedLlm("unused".to_string())),
        verifier,
    );
    let app = Router::new()
        .nest("/api/v1", create_api_router())
        .with_state(state.clone());

    TestContext {
        server: TestServer::new(app).expect("test server"),
        state,
        token,
        other_token,
    }
}

fn history_item(title: &str, tag: &str) -> HistoryItem {
    HistoryItem {
        title: title.to_string(),
        diagram_type_tag: tag.to_string(),
        diagram_code: "graph TD; A-->B;".to_string(),
        analysis: Analysis::default(),
        created_at: Utc::now(),
    }
}

async fn generate(ctx: &TestContext, token: &str, text: &str) -> Value {
    let response = ctx
        .server
        .post("/api/v1/generate")
        .authorization_bearer(token)
        .json(&json!({
            "text": text,
            "diagramType": "flowchart",
            "diagramTypeName": "DFD (Data Flow Diagram)",
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    response.json()
}

#[tokio::test]
async fn test_history_requires_authentication() {
    let ctx = setup();
    assert_eq!(ctx.server.get("/api/v1/diagrams").await.status_code(), 401);
    assert_eq!(
        ctx.server.get("/api/v1/diagrams/recent").await.status_code(),
        401
    );
}

#[tokio::test]
async fn test_list_returns_own_diagrams_newest_first() {
    let ctx = setup();
    generate(&ctx, &ctx.token, "first process").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    generate(&ctx, &ctx.token, "second process").await;
    generate(&ctx, &ctx.other_token, "someone elses process").await;

    let response = ctx
        .server
        .get("/api/v1/diagrams")
        .authorization_bearer(&ctx.token)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let diagrams = body.as_array().unwrap();
    assert_eq!(diagrams.len(), 2);
    assert_eq!(diagrams[0]["description"], "second process");
    assert_eq!(diagrams[1]["description"], "first process");
}

#[tokio::test]
async fn test_get_diagram_by_id_is_owner_scoped() {
    let ctx = setup();
    let created = generate(&ctx, &ctx.token, "a process").await;
    let id = created["diagramId"].as_str().unwrap();

    let response = ctx
        .server
        .get(&format!("/api/v1/diagrams/{id}"))
        .authorization_bearer(&ctx.token)
        .await;
    assert_eq!(response.status_code(), 200);

    let response = ctx
        .server
        .get(&format!("/api/v1/diagrams/{id}"))
        .authorization_bearer(&ctx.other_token)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_recent_starts_empty_and_tracks_generations() {
    let ctx = setup();

    let response = ctx
        .server
        .get("/api/v1/diagrams/recent")
        .authorization_bearer(&ctx.token)
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 0);

    generate(&ctx, &ctx.token, "a process").await;

    let response = ctx
        .server
        .get("/api/v1/diagrams/recent")
        .authorization_bearer(&ctx.token)
        .await;
    let body: Value = response.json();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["diagramType"], "flowchart");
    assert_eq!(items[0]["diagramCode"], "flowchart TD; A-->B;");
}

#[tokio::test]
async fn test_recent_normalizes_legacy_tags() {
    let ctx = setup();
    ctx.state
        .push_recent("user_123", history_item("old gantt", "gantt"))
        .await;
    ctx.state
        .push_recent("user_123", history_item("old sequence", "sequenceDiagram"))
        .await;
    ctx.state
        .push_recent("user_123", history_item("unknown tag", "timeline"))
        .await;

    let response = ctx
        .server
        .get("/api/v1/diagrams/recent")
        .authorization_bearer(&ctx.token)
        .await;
    let body: Value = response.json();
    let items = body.as_array().unwrap();
    // Newest first: timeline, sequenceDiagram, gantt.
    assert_eq!(items[0]["diagramType"], "flowchart");
    assert_eq!(items[1]["diagramType"], "class_diagram");
    assert_eq!(items[2]["diagramType"], "flowchart");
}

#[tokio::test]
async fn test_recent_is_capped_at_ten_items() {
    let ctx = setup();
    for i in 0..12 {
        ctx.state
            .push_recent("user_123", history_item(&format!("item {i}"), "flowchart"))
            .await;
    }

    let response = ctx
        .server
        .get("/api/v1/diagrams/recent")
        .authorization_bearer(&ctx.token)
        .await;
    let body: Value = response.json();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["title"], "item 11");
    assert_eq!(items[9]["title"], "item 2");
}

#[tokio::test]
async fn test_recent_evicts_stalest_user_at_tracked_user_limit() {
    let ctx = setup();
    let base = Utc::now();
    for i in 0..=MAX_TRACKED_USERS {
        let mut item = history_item(&format!("item {i}"), "flowchart");
        item.created_at = base + Duration::seconds(i as i64);
        ctx.state.push_recent(&format!("user_{i}"), item).await;
    }

    // The first user's buffer made way for the one past the limit.
    assert!(ctx.state.recent_for("user_0").await.is_empty());
    assert_eq!(
        ctx.state
            .recent_for(&format!("user_{MAX_TRACKED_USERS}"))
            .await
            .len(),
        1
    );
    assert_eq!(ctx.state.recent_for("user_1").await.len(), 1);
}

#[tokio::test]
async fn test_recent_is_per_user() {
    let ctx = setup();
    generate(&ctx, &ctx.token, "my process").await;

    let response = ctx
        .server
        .get("/api/v1/diagrams/recent")
        .authorization_bearer(&ctx.other_token)
        .await;
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 0);
}
