//! Admin authentication extractor
//!
//! Validates the admin bearer token. When no admin identity is configured
//! every admin route answers 503, whatever the request carries.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use folio_service::{AdminAuthService, ServiceError};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated admin
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        if app_state.service_context().jwt_service().is_none() {
            return Err(ServiceError::unavailable("Admin access is not configured").into());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let claims = AdminAuthService::new(app_state.service_context())
            .verify(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected admin token");
                ApiError::InvalidToken
            })?;

        if !claims.is_admin() {
            return Err(ApiError::InvalidToken);
        }

        Ok(Self {
            username: claims.sub,
        })
    }
}
