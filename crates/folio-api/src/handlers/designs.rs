//! Ban page design handlers

use axum::{extract::State, Json};
use folio_core::BanPageDesign;
use folio_service::dto::UpsertDesignRequest;
use folio_service::{DesignResolver, ModerationService};

use crate::extractors::{AdminUser, CategoryPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Current design of a tier; the default when none is stored
///
/// GET /designs/{category}
pub async fn get_design(
    State(state): State<AppState>,
    CategoryPath(category): CategoryPath,
) -> Json<BanPageDesign> {
    Json(DesignResolver::new(state.service_context()).get(category).await)
}

/// Every tier's design
///
/// GET /admin/designs
pub async fn list_designs(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<BanPageDesign>>> {
    let designs = ModerationService::new(state.service_context())
        .list_designs()
        .await?;
    Ok(Json(designs))
}

/// Publish a new revision of a tier's design
///
/// PUT /admin/designs/{category}
pub async fn upsert_design(
    State(state): State<AppState>,
    admin: AdminUser,
    CategoryPath(category): CategoryPath,
    ValidatedJson(request): ValidatedJson<UpsertDesignRequest>,
) -> ApiResult<Json<BanPageDesign>> {
    let design = ModerationService::new(state.service_context())
        .upsert_design(category, request, Some(admin.username))
        .await?;
    Ok(Json(design))
}
