//! Admin handlers
//!
//! Login plus visitor moderation. Every route except login requires
//! an `AdminUser`.

use axum::{
    extract::{Query, State},
    Json,
};
use folio_common::AdminToken;
use folio_core::{Appeal, VisitorRecord};
use folio_service::dto::{AdminLoginRequest, BanVisitorRequest, ListVisitorsQuery, UpdateNotesRequest};
use folio_service::{AdminAuthService, AppealService, ModerationService};

use crate::extractors::{AdminUser, ValidatedJson, VisitorPath};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Exchange admin credentials for a token
///
/// POST /admin/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AdminLoginRequest>,
) -> ApiResult<Json<AdminToken>> {
    let token = AdminAuthService::new(state.service_context())
        .login(request)
        .await?;
    Ok(Json(token))
}

/// List visitors
///
/// GET /admin/visitors?status=&limit=
pub async fn list_visitors(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListVisitorsQuery>,
) -> ApiResult<Json<Vec<VisitorRecord>>> {
    let visitors = ModerationService::new(state.service_context())
        .list(query)
        .await?;
    Ok(Json(visitors))
}

/// Ban a visitor
///
/// POST /admin/visitors/{visitor_id}/ban
pub async fn ban_visitor(
    State(state): State<AppState>,
    admin: AdminUser,
    VisitorPath(visitor_id): VisitorPath,
    ValidatedJson(request): ValidatedJson<BanVisitorRequest>,
) -> ApiResult<Json<VisitorRecord>> {
    tracing::info!(admin = %admin.username, %visitor_id, "Ban requested");
    let record = ModerationService::new(state.service_context())
        .ban(visitor_id, request)
        .await?;
    Ok(Json(record))
}

/// Lift a ban
///
/// POST /admin/visitors/{visitor_id}/unban
pub async fn unban_visitor(
    State(state): State<AppState>,
    admin: AdminUser,
    VisitorPath(visitor_id): VisitorPath,
) -> ApiResult<Json<VisitorRecord>> {
    tracing::info!(admin = %admin.username, %visitor_id, "Unban requested");
    let record = ModerationService::new(state.service_context())
        .unban(visitor_id)
        .await?;
    Ok(Json(record))
}

/// Replace admin notes
///
/// PATCH /admin/visitors/{visitor_id}/notes
pub async fn update_notes(
    State(state): State<AppState>,
    _admin: AdminUser,
    VisitorPath(visitor_id): VisitorPath,
    ValidatedJson(request): ValidatedJson<UpdateNotesRequest>,
) -> ApiResult<Json<VisitorRecord>> {
    let record = ModerationService::new(state.service_context())
        .update_notes(visitor_id, request)
        .await?;
    Ok(Json(record))
}

/// Delete a visitor document
///
/// DELETE /admin/visitors/{visitor_id}
pub async fn delete_visitor(
    State(state): State<AppState>,
    _admin: AdminUser,
    VisitorPath(visitor_id): VisitorPath,
) -> ApiResult<NoContent> {
    ModerationService::new(state.service_context())
        .delete(visitor_id)
        .await?;
    Ok(NoContent)
}

/// Appeals filed by a visitor
///
/// GET /admin/visitors/{visitor_id}/appeals
pub async fn list_appeals(
    State(state): State<AppState>,
    _admin: AdminUser,
    VisitorPath(visitor_id): VisitorPath,
) -> ApiResult<Json<Vec<Appeal>>> {
    let appeals = AppealService::new(state.service_context())
        .list_for_visitor(visitor_id)
        .await?;
    Ok(Json(appeals))
}
