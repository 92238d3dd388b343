//! Visitor service
//!
//! Handles the tracking beacon, presence heartbeats, and status lookups
//! made by the portfolio page.

use tracing::{debug, instrument, warn};

use folio_core::VisitorId;

use crate::dto::{HeartbeatRequest, TrackVisitRequest, VisitorStatusResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Visitor service
pub struct VisitorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VisitorService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a page visit, creating the visitor on first sight
    #[instrument(skip(self, request))]
    pub async fn track(
        &self,
        visitor_id: VisitorId,
        request: TrackVisitRequest,
    ) -> ServiceResult<VisitorStatusResponse> {
        let record = self
            .ctx
            .visitor_repo()
            .record_visit(visitor_id, &request.device, request.location.as_ref())
            .await?;
        self.mark_presence(visitor_id, true).await;

        debug!(visitor_id = %visitor_id, visits = record.visit_count, "Visit tracked");
        Ok(VisitorStatusResponse::from_record(&record))
    }

    /// Refresh presence; unknown visitors are not created here
    #[instrument(skip(self))]
    pub async fn heartbeat(&self, visitor_id: VisitorId, request: HeartbeatRequest) -> ServiceResult<()> {
        self.mark_presence(visitor_id, request.online).await;

        if !self.ctx.visitor_repo().touch(visitor_id, request.online).await? {
            debug!(visitor_id = %visitor_id, "Heartbeat from untracked visitor");
        }

        Ok(())
    }

    /// Current status; unknown visitors are active
    #[instrument(skip(self))]
    pub async fn status(&self, visitor_id: VisitorId) -> ServiceResult<VisitorStatusResponse> {
        let record = self.ctx.visitor_repo().find_by_id(visitor_id).await?;
        Ok(record.map_or_else(
            || VisitorStatusResponse::active(visitor_id),
            |r| VisitorStatusResponse::from_record(&r),
        ))
    }

    /// Status lookup that never fails; storage errors read as active
    pub async fn status_or_active(&self, visitor_id: VisitorId) -> VisitorStatusResponse {
        match self.status(visitor_id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(visitor_id = %visitor_id, error = %e, "Status lookup failed, treating as active");
                VisitorStatusResponse::active(visitor_id)
            }
        }
    }

    async fn mark_presence(&self, visitor_id: VisitorId, online: bool) {
        if let Err(e) = self.ctx.presence().set_online(visitor_id, online).await {
            warn!(visitor_id = %visitor_id, error = %e, "Failed to update presence");
        }
    }
}
