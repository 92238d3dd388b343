//! Appeal submission handler (JSON)

use axum::{extract::State, Json};
use folio_service::dto::{AppealRequest, AppealResponse};
use folio_service::AppealService;

use crate::extractors::ValidatedJson;
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Submit an appeal
///
/// POST /appeals
pub async fn submit_appeal(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AppealRequest>,
) -> ApiResult<Created<Json<AppealResponse>>> {
    let response = AppealService::new(state.service_context())
        .submit(request)
        .await?;
    Ok(Created(Json(response)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use folio_core::VisitorId;
    use serde_json::json;

    use crate::test_support::{body_json, json as json_request, send, test_app};

    #[tokio::test]
    async fn test_submit_appeal() {
        let (app, _store) = test_app();
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/v1/appeals",
                json!({
                    "name": "Sam",
                    "email": "sam@example.com",
                    "subject": "Ban review",
                    "message": "I think this was a mistake.",
                    "visitor_id": VisitorId::generate().to_string(),
                }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["success"], true);
    }

    #[tokio::test]
    async fn test_appeal_validation_details() {
        let (app, _store) = test_app();
        let response = send(
            &app,
            json_request(
                "POST",
                "/api/v1/appeals",
                json!({
                    "name": "",
                    "email": "nope",
                    "subject": "x",
                    "message": "y",
                    "visitor_id": "abc",
                }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["details"].to_string().contains("email"));
    }
}
