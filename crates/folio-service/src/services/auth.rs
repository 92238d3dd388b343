//! Admin authentication service
//!
//! A single admin identity from configuration; without it the admin surface
//! answers 503.

use tracing::{info, instrument, warn};
use validator::Validate;

use folio_common::{credentials_match, AdminClaims, AdminToken, AppError};

use crate::dto::AdminLoginRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const NOT_CONFIGURED: &str = "Admin access is not configured";

/// Admin authentication service
pub struct AdminAuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminAuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Exchange credentials for an access token
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: AdminLoginRequest) -> ServiceResult<AdminToken> {
        let (Some(admin), Some(jwt)) = (self.ctx.admin_config(), self.ctx.jwt_service()) else {
            return Err(ServiceError::unavailable(NOT_CONFIGURED));
        };

        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        if !credentials_match(admin, &request.username, &request.password) {
            warn!("Admin login rejected");
            return Err(AppError::InvalidCredentials.into());
        }

        let token = jwt.issue(&request.username)?;
        info!("Admin logged in");
        Ok(token)
    }

    /// Validate a bearer token
    pub fn verify(&self, token: &str) -> ServiceResult<AdminClaims> {
        let jwt = self
            .ctx
            .jwt_service()
            .ok_or_else(|| ServiceError::unavailable(NOT_CONFIGURED))?;
        Ok(jwt.validate(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::test_support::{memory_context, memory_context_with};
    use crate::services::context::ServiceContextBuilder;
    use folio_common::AdminConfig;

    fn admin_context() -> ServiceContext {
        let admin = AdminConfig {
            username: "admin".to_string(),
            password: "hunter22".to_string(),
            jwt_secret: "test-signing-secret".to_string(),
            token_expiry: 600,
        };
        memory_context_with(ServiceContextBuilder::new().admin(Some(admin))).0
    }

    fn login(username: &str, password: &str) -> AdminLoginRequest {
        AdminLoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_and_verify_round_trip() {
        let ctx = admin_context();
        let service = AdminAuthService::new(&ctx);

        let token = service.login(login("admin", "hunter22")).await.unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = service.verify(&token.access_token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.is_admin());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let ctx = admin_context();
        let err = AdminAuthService::new(&ctx)
            .login(login("admin", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_unconfigured_admin_is_unavailable() {
        let (ctx, _store) = memory_context();
        let service = AdminAuthService::new(&ctx);

        let err = service.login(login("admin", "hunter22")).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(service.verify("anything").unwrap_err().status_code(), 503);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let ctx = admin_context();
        let err = AdminAuthService::new(&ctx).verify("not.a.token").unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
