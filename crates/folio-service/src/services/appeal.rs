//! Appeal service
//!
//! Stores appeals submitted from the ban page.

use tracing::{info, instrument};
use validator::Validate;

use folio_core::{Appeal, VisitorId};

use crate::dto::{AppealRequest, AppealResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Appeal service
pub struct AppealService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AppealService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Validate and store an appeal
    #[instrument(skip(self, request), fields(visitor_id = %request.visitor_id))]
    pub async fn submit(&self, request: AppealRequest) -> ServiceResult<AppealResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let visitor_id: VisitorId = request.visitor_id.parse()?;
        let appeal = Appeal::new(
            visitor_id,
            request.name.trim().to_string(),
            request.email.trim().to_string(),
            request.subject.trim().to_string(),
            request.message.trim().to_string(),
            request.ban_reason.filter(|r| !r.trim().is_empty()),
        );

        self.ctx.appeal_repo().create(&appeal).await?;
        info!(appeal_id = %appeal.id, "Appeal submitted");

        Ok(AppealResponse {
            success: true,
            id: appeal.id,
        })
    }

    /// Appeals filed by a visitor, newest first
    #[instrument(skip(self))]
    pub async fn list_for_visitor(&self, visitor_id: VisitorId) -> ServiceResult<Vec<Appeal>> {
        Ok(self.ctx.appeal_repo().find_by_visitor(visitor_id).await?)
    }
}
