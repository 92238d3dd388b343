//! Route definitions
//!
//! HTML pages at the root, JSON endpoints under /api/v1.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{admin, appeals, designs, health, pages, policy, visitors};
use crate::state::AppState;

/// Create the main router (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Pages served to browsers
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/ban", get(pages::anonymous_ban_page))
        .route("/ban/:visitor_id", get(pages::ban_page))
        .route("/appeal", get(pages::appeal_form).post(pages::submit_appeal_form))
        .route("/:visitor_id", get(pages::portfolio))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(visitor_routes())
        .merge(public_routes())
        .merge(admin_routes())
}

/// Beacons from the portfolio page
fn visitor_routes() -> Router<AppState> {
    Router::new()
        .route("/visitors/:visitor_id/track", post(visitors::track))
        .route("/visitors/:visitor_id/heartbeat", post(visitors::heartbeat))
        .route("/visitors/:visitor_id/status", get(visitors::status))
        .route(
            "/visitors/:visitor_id/policy-reference",
            get(visitors::policy_reference),
        )
}

/// Unauthenticated lookups and appeal submission
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/designs/:category", get(designs::get_design))
        .route("/policy/classify", get(policy::classify))
        .route("/appeals", post(appeals::submit_appeal))
}

/// Moderation; everything but login requires an admin token
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(admin::login))
        .route("/admin/visitors", get(admin::list_visitors))
        .route("/admin/visitors/:visitor_id", delete(admin::delete_visitor))
        .route("/admin/visitors/:visitor_id/ban", post(admin::ban_visitor))
        .route("/admin/visitors/:visitor_id/unban", post(admin::unban_visitor))
        .route("/admin/visitors/:visitor_id/notes", patch(admin::update_notes))
        .route("/admin/visitors/:visitor_id/appeals", get(admin::list_appeals))
        .route("/admin/designs", get(designs::list_designs))
        .route("/admin/designs/:category", put(designs::upsert_design))
}
