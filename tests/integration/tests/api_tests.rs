//! API Integration Tests
//!
//! Runs against the in-memory store; no external services needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{assert_json, assert_status, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
}

// ============================================================================
// Visitor Tests
// ============================================================================

#[tokio::test]
async fn test_tracked_visitor_is_active() {
    let server = TestServer::start().await.unwrap();
    let id = new_visitor();

    let response = server
        .post_empty(&format!("/api/v1/visitors/{id}/track"))
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = server.get(&format!("/api/v1/visitors/{id}/status")).await.unwrap();
    let status: StatusBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(status.visitor_id, id.to_string());
    assert_eq!(status.status, "active");
    assert!(status.redirect_to.is_none());
}

#[tokio::test]
async fn test_heartbeat_accepted() {
    let server = TestServer::start().await.unwrap();
    let id = new_visitor();

    let response = server
        .post(&format!("/api/v1/visitors/{id}/heartbeat"), &json!({ "online": true }))
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_classify_reason() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .get("/api/v1/policy/classify?reason=Repeated%20threats")
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["category"], "severe");
    assert_eq!(body["severity"], 9);
}

// ============================================================================
// Moderation Flow Tests
// ============================================================================

#[tokio::test]
async fn test_banned_visitor_lands_on_ban_page() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();

    server
        .post_empty(&format!("/api/v1/visitors/{id}/track"))
        .await
        .unwrap();
    let response = server
        .post_auth(
            &format!("/api/v1/admin/visitors/{id}/ban"),
            &token,
            &BanRequest::reason("Repeated threats"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get(&format!("/api/v1/visitors/{id}/status")).await.unwrap();
    let status: StatusBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(status.status, "banned");
    assert_eq!(status.ban_category.as_deref(), Some("severe"));
    assert!(status
        .redirect_to
        .as_deref()
        .unwrap()
        .starts_with(&format!("/ban/{id}?")));

    // The portfolio route redirects; the client follows it
    let response = server.get(&format!("/{id}")).await.unwrap();
    assert!(response.url().path().starts_with("/ban/"));
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"data-category="severe""#));
    assert!(html.contains(&format!("/ban/{id}/live")));
}

#[tokio::test]
async fn test_unban_restores_portfolio() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();

    server
        .post_auth(
            &format!("/api/v1/admin/visitors/{id}/ban"),
            &token,
            &BanRequest::reason("spam"),
        )
        .await
        .unwrap();
    let response = server
        .post_auth(&format!("/api/v1/admin/visitors/{id}/unban"), &token, &json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get(&format!("/{id}")).await.unwrap();
    assert_eq!(response.url().path(), format!("/{id}"));
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let server = TestServer::start().await.unwrap();
    let id = new_visitor();

    let response = server
        .post(&format!("/api/v1/admin/visitors/{id}/ban"), &BanRequest::reason("spam"))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_published_design_reaches_ban_page() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();

    let response = server.get("/api/v1/designs/medium").await.unwrap();
    let mut design: Value = assert_json(response, StatusCode::OK).await.unwrap();
    design["content"]["title"] = json!("Cooling off period");

    let response = server
        .put_auth(
            "/api/v1/admin/designs/medium",
            &token,
            &json!({ "design": design, "summary": "New title" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let html = server
        .get("/ban?category=medium")
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Cooling off period"));
}

// ============================================================================
// Appeal Tests
// ============================================================================

#[tokio::test]
async fn test_appeal_is_listed_for_admin() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();

    let response = server
        .post("/api/v1/appeals", &AppealSubmission::for_visitor(id))
        .await
        .unwrap();
    let created: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created["success"], true);

    let response = server
        .client
        .get(format!("{}/api/v1/admin/visitors/{id}/appeals", server.base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let appeals: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(appeals.len(), 1);
    assert_eq!(appeals[0]["email"], "sam@example.com");
}

#[tokio::test]
async fn test_invalid_appeal_rejected() {
    let server = TestServer::start().await.unwrap();
    let mut appeal = AppealSubmission::for_visitor(new_visitor());
    appeal.email = "not-an-email".to_string();

    let response = server.post("/api/v1/appeals", &appeal).await.unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
