//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::VisitorId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Visitor not found: {0}")]
    VisitorNotFound(VisitorId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid visitor id: {0}")]
    InvalidVisitorId(String),

    #[error("Invalid ban category: {0}")]
    InvalidCategory(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Visitor is not banned")]
    NotBanned,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Database is not configured")]
    StorageUnavailable,

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::VisitorNotFound(_) => "UNKNOWN_VISITOR",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidVisitorId(_) => "INVALID_VISITOR_ID",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",

            // Business Rules
            Self::NotBanned => "NOT_BANNED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::VisitorNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidVisitorId(_) | Self::InvalidCategory(_)
        )
    }

    /// Check if this is a transient infrastructure failure worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::CacheError(_))
    }
}

impl From<crate::value_objects::BanCategoryParseError> for DomainError {
    fn from(err: crate::value_objects::BanCategoryParseError) -> Self {
        Self::InvalidCategory(err.0)
    }
}
