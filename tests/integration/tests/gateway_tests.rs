//! Gateway Integration Tests
//!
//! Live ban pages over real sockets, driven by admin actions on the API.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use folio_core::traits::PresenceTracker;
use folio_core::VisitorId;
use integration_tests::{assert_json, eventually, fixtures::*, GatewayClient, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Ban `id` and return the status the portfolio page would see
async fn ban(server: &TestServer, token: &str, id: VisitorId, request: &BanRequest) -> StatusBody {
    let response = server
        .post_auth(&format!("/api/v1/admin/visitors/{id}/ban"), token, request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.get(&format!("/api/v1/visitors/{id}/status")).await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

/// Connect to the live page for `status` and consume HELLO and the first render
async fn open_ban_page(server: &TestServer, status: &StatusBody) -> (GatewayClient, Value) {
    let path = status.live_path().expect("banned status has a redirect");
    let mut client = server.connect_gateway(&path).await.unwrap();

    let hello = client.next_frame().await.unwrap();
    assert_eq!(hello["op"], 10);

    let render = client.expect_dispatch("BAN_PAGE_RENDER").await.unwrap();
    (client, render)
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_hello_then_initial_render() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();
    let status = ban(&server, &token, id, &BanRequest::reason("harassment")).await;

    let path = status.live_path().unwrap();
    let mut client = server.connect_gateway(&path).await.unwrap();

    let hello = client.next_frame().await.unwrap();
    assert_eq!(hello["op"], 10);
    assert_eq!(hello["d"]["heartbeat_interval"], 45000);

    let render = client.next_frame().await.unwrap();
    assert_eq!(render["op"], 0);
    assert_eq!(render["t"], "BAN_PAGE_RENDER");
    assert_eq!(render["s"], 1);
    assert_eq!(render["d"]["view"]["category"], "danger");
    assert_eq!(render["d"]["view"]["severity"], 7);
    assert_eq!(render["d"]["view"]["policyReference"], json!(status.policy_reference));
    assert!(render["d"]["html"].as_str().unwrap().contains("danger"));
}

#[tokio::test]
async fn test_invalid_visitor_id_rejected() {
    let server = TestServer::start().await.unwrap();
    assert!(server.connect_gateway("/ban/not-a-visitor/live").await.is_err());
}

#[tokio::test]
async fn test_anonymous_page_renders_requested_category() {
    let server = TestServer::start().await.unwrap();
    let mut client = server
        .connect_gateway("/ban/live?category=severe&reason=abuse")
        .await
        .unwrap();

    assert_eq!(client.next_frame().await.unwrap()["op"], 10);
    let render = client.expect_dispatch("BAN_PAGE_RENDER").await.unwrap();
    assert_eq!(render["view"]["category"], "severe");
    assert_eq!(render["view"]["banReason"], "abuse");
    assert!(render["view"]["visitorId"].is_null());
}

// ============================================================================
// Protocol
// ============================================================================

#[tokio::test]
async fn test_heartbeat_acknowledged() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect_gateway("/ban/live").await.unwrap();
    client.expect_dispatch("BAN_PAGE_RENDER").await.unwrap();

    client.send_json(&json!({ "op": 1, "d": 1 })).await.unwrap();
    let ack = client.next_frame().await.unwrap();
    assert_eq!(ack["op"], 11);
}

#[tokio::test]
async fn test_unknown_opcode_closes_socket() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect_gateway("/ban/live").await.unwrap();
    client.expect_dispatch("BAN_PAGE_RENDER").await.unwrap();

    client.send_json(&json!({ "op": 10, "d": null })).await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4001));
}

#[tokio::test]
async fn test_malformed_frame_closes_socket() {
    let server = TestServer::start().await.unwrap();
    let mut client = server.connect_gateway("/ban/live").await.unwrap();
    client.expect_dispatch("BAN_PAGE_RENDER").await.unwrap();

    client.send_json(&json!({ "hello": "there" })).await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4002));
}

// ============================================================================
// Live Updates
// ============================================================================

#[tokio::test]
async fn test_unban_redirects_and_closes() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();
    let status = ban(&server, &token, id, &BanRequest::reason("spam")).await;
    let (mut client, _) = open_ban_page(&server, &status).await;

    let response = server
        .post_auth(&format!("/api/v1/admin/visitors/{id}/unban"), &token, &json!({}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let unbanned = client.expect_dispatch("BAN_PAGE_UNBANNED").await.unwrap();
    assert_eq!(unbanned["redirect_to"], format!("/{id}"));
    assert_eq!(client.expect_close().await.unwrap(), Some(1000));
}

#[tokio::test]
async fn test_category_change_transitions_then_renders() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();
    let status = ban(&server, &token, id, &BanRequest::reason("spam")).await;
    let (mut client, render) = open_ban_page(&server, &status).await;
    assert_eq!(render["view"]["category"], "normal");

    ban(
        &server,
        &token,
        id,
        &BanRequest::reason("spam").with_category("severe"),
    )
    .await;

    let transition = client.expect_dispatch("BAN_PAGE_TRANSITIONING").await.unwrap();
    assert_eq!(transition["from"], "normal");
    assert_eq!(transition["to"], "severe");

    let render = client.expect_dispatch("BAN_PAGE_RENDER").await.unwrap();
    assert_eq!(render["view"]["category"], "severe");
    assert_eq!(render["view"]["severity"], 9);
}

#[tokio::test]
async fn test_design_publish_rerenders_open_page() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();
    let status = ban(
        &server,
        &token,
        id,
        &BanRequest::reason("spam").with_category("medium"),
    )
    .await;
    let (mut client, _) = open_ban_page(&server, &status).await;

    let response = server.get("/api/v1/designs/medium").await.unwrap();
    let mut design: Value = assert_json(response, StatusCode::OK).await.unwrap();
    design["content"]["title"] = json!("Updated while open");
    let response = server
        .put_auth(
            "/api/v1/admin/designs/medium",
            &token,
            &json!({ "design": design, "summary": "Live edit" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The feed may replay the default first; wait for the published title
    loop {
        let render = client.expect_dispatch("BAN_PAGE_RENDER").await.unwrap();
        if render["view"]["design"]["content"]["title"] == "Updated while open" {
            assert!(render["html"].as_str().unwrap().contains("Updated while open"));
            break;
        }
    }
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_presence_follows_socket() {
    let server = TestServer::start().await.unwrap();
    let token = server.admin_token().await.unwrap();
    let id = new_visitor();
    let status = ban(&server, &token, id, &BanRequest::reason("spam")).await;

    let (client, _) = open_ban_page(&server, &status).await;
    assert!(server.store.is_online(id).await.unwrap());

    client.close().await.unwrap();
    let store = server.store.clone();
    assert!(
        eventually(|| {
            let store = store.clone();
            async move { !store.is_online(id).await.unwrap_or(true) }
        })
        .await
    );
}
