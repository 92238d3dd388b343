//! Policy classification handler

use axum::{
    extract::{Query, State},
    Json,
};
use folio_core::CategoryClassifier;
use folio_service::dto::{ClassificationResponse, ClassifyQuery};

use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Map a reason or a severity score to a tier
///
/// GET /policy/classify?reason=...|severity=...
pub async fn classify(
    State(_state): State<AppState>,
    Query(query): Query<ClassifyQuery>,
) -> ApiResult<Json<ClassificationResponse>> {
    let category = match (query.reason.as_deref(), query.severity) {
        (Some(reason), _) => CategoryClassifier::from_reason(reason),
        (None, Some(severity)) if severity.is_finite() => CategoryClassifier::from_severity_f64(severity),
        (None, Some(_)) => return Err(ApiError::invalid_query("severity must be a number")),
        (None, None) => return Err(ApiError::invalid_query("reason or severity is required")),
    };
    Ok(Json(ClassificationResponse::new(category)))
}
