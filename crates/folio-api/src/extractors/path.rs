//! Path parameter extractors
//!
//! Routes carry a single parameter: a visitor UUID or a ban category.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use folio_core::{BanCategory, VisitorId};

use crate::response::ApiError;

/// Visitor id from the path; malformed UUIDs are a 400
#[derive(Debug, Clone, Copy)]
pub struct VisitorPath(pub VisitorId);

/// Ban category from the path
#[derive(Debug, Clone, Copy)]
pub struct CategoryPath(pub BanCategory);

async fn single_segment<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<String, ApiError> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::invalid_path(e.to_string()))?;
    Ok(raw)
}

pub(crate) fn parse_visitor_id(raw: &str) -> Result<VisitorId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid visitor id: {raw}")))
}

pub(crate) fn parse_category(raw: &str) -> Result<BanCategory, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid category: {raw}")))
}

#[async_trait]
impl<S> FromRequestParts<S> for VisitorPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = single_segment(parts, state).await?;
        Ok(Self(parse_visitor_id(&raw)?))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CategoryPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = single_segment(parts, state).await?;
        Ok(Self(parse_category(&raw)?))
    }
}
