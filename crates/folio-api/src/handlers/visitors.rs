//! Visitor beacon handlers
//!
//! Called by the portfolio page: tracking on load, heartbeats while open,
//! and status checks.

use axum::{extract::State, Json};
use folio_service::dto::{HeartbeatRequest, PolicyReferenceResponse, TrackVisitRequest, VisitorStatusResponse};
use folio_service::{PolicyReferenceService, VisitorService};

use crate::extractors::VisitorPath;
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Record a page visit
///
/// POST /visitors/{visitor_id}/track
pub async fn track(
    State(state): State<AppState>,
    VisitorPath(visitor_id): VisitorPath,
    body: Option<Json<TrackVisitRequest>>,
) -> ApiResult<Json<VisitorStatusResponse>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let status = VisitorService::new(state.service_context())
        .track(visitor_id, request)
        .await?;
    Ok(Json(status))
}

/// Presence heartbeat
///
/// POST /visitors/{visitor_id}/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    VisitorPath(visitor_id): VisitorPath,
    body: Option<Json<HeartbeatRequest>>,
) -> ApiResult<NoContent> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    VisitorService::new(state.service_context())
        .heartbeat(visitor_id, request)
        .await?;
    Ok(NoContent)
}

/// Current ban status
///
/// GET /visitors/{visitor_id}/status
pub async fn status(
    State(state): State<AppState>,
    VisitorPath(visitor_id): VisitorPath,
) -> ApiResult<Json<VisitorStatusResponse>> {
    let status = VisitorService::new(state.service_context())
        .status(visitor_id)
        .await?;
    Ok(Json(status))
}

/// Stored policy reference, generated on first request
///
/// `null` when storage could not be reached; the page keeps its placeholder.
///
/// GET /visitors/{visitor_id}/policy-reference
pub async fn policy_reference(
    State(state): State<AppState>,
    VisitorPath(visitor_id): VisitorPath,
) -> ApiResult<Json<PolicyReferenceResponse>> {
    let policy_reference = PolicyReferenceService::new(state.service_context())
        .fetch_or_generate(visitor_id)
        .await;

    Ok(Json(PolicyReferenceResponse {
        visitor_id,
        policy_reference,
    }))
}
