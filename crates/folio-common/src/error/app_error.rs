//! Application error types
//!
//! Errors raised outside the domain: admin auth, backend wiring, and the
//! optional subsystems that may be left unconfigured.

use folio_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Admin authentication
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Backends
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    /// Admin or storage left unconfigured; callers degrade to a 503
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// HTTP status for a domain error, shared by every layer that reports one
#[must_use]
pub fn domain_status(err: &DomainError) -> u16 {
    match err {
        _ if err.is_not_found() => 404,
        _ if err.is_validation() => 400,
        DomainError::NotBanned => 409,
        DomainError::StorageUnavailable => 503,
        _ => 500,
    }
}

impl AppError {
    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired => 401,
            Self::NotFound(_) => 404,
            Self::ServiceUnavailable(_) => 503,
            Self::Database(_) | Self::Cache(_) | Self::Config(_) | Self::Internal(_) => 500,
            Self::Domain(e) => domain_status(e),
        }
    }

    /// Error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// `{code, message, details}` part of an error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::VisitorId;

    #[test]
    fn test_auth_and_backend_status() {
        assert_eq!(AppError::InvalidCredentials.status_code(), 401);
        assert_eq!(AppError::TokenExpired.status_code(), 401);
        assert_eq!(AppError::ServiceUnavailable("admin".to_string()).status_code(), 503);
        assert_eq!(AppError::Cache("redis down".to_string()).status_code(), 500);
    }

    #[test]
    fn test_domain_status_mapping() {
        assert_eq!(domain_status(&DomainError::VisitorNotFound(VisitorId::generate())), 404);
        assert_eq!(domain_status(&DomainError::InvalidVisitorId("x".to_string())), 400);
        assert_eq!(domain_status(&DomainError::NotBanned), 409);
        assert_eq!(domain_status(&DomainError::StorageUnavailable), 503);
        assert_eq!(domain_status(&DomainError::DatabaseError("boom".to_string())), 500);

        let err = AppError::from(DomainError::VisitorNotFound(VisitorId::generate()));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "UNKNOWN_VISITOR");
    }

    #[test]
    fn test_error_response_from_app_error() {
        let response = ErrorResponse::from(&AppError::not_found("design"));
        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.message, "Resource not found: design");
        assert!(response.details.is_none());
    }
}
