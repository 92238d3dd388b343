//! Moderation service
//!
//! Admin-only writes: banning and unbanning visitors, notes, deletion, and
//! publishing design revisions. Every write notifies live feeds.

use tracing::{info, instrument, warn};

use folio_core::{
    generate_policy_reference, is_valid_policy_reference, BanCategory, BanPageDesign,
    CategoryClassifier, DomainError, VisitorId, VisitorRecord, VisitorStatus,
};

use crate::dto::{BanVisitorRequest, ListVisitorsQuery, UpdateNotesRequest, UpsertDesignRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

/// Moderation service
pub struct ModerationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ModerationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ban a visitor, creating the record if they were never tracked
    #[instrument(skip(self, request))]
    pub async fn ban(&self, visitor_id: VisitorId, request: BanVisitorRequest) -> ServiceResult<VisitorRecord> {
        self.ctx.require_storage()?;

        let reason = request.reason.trim().to_string();
        if reason.is_empty() {
            return Err(ServiceError::validation("Reason must not be blank"));
        }

        let category = match (request.category.as_deref(), request.severity) {
            (Some(category), _) => category.parse::<BanCategory>().map_err(DomainError::from)?,
            (None, Some(severity)) => CategoryClassifier::from_severity_f64(severity),
            (None, None) => CategoryClassifier::from_reason(&reason),
        };

        let mut record = self
            .ctx
            .visitor_repo()
            .find_by_id(visitor_id)
            .await?
            .unwrap_or_else(|| VisitorRecord::new(visitor_id));

        let reference = record
            .policy_reference
            .clone()
            .filter(|r| is_valid_policy_reference(r))
            .unwrap_or_else(generate_policy_reference);

        record.ban(reason, category, Some(reference));
        if request.notes.is_some() {
            record.admin_notes = request.notes;
        }

        self.save(&record).await?;
        info!(visitor_id = %visitor_id, %category, "Visitor banned");
        Ok(record)
    }

    /// Lift a ban
    #[instrument(skip(self))]
    pub async fn unban(&self, visitor_id: VisitorId) -> ServiceResult<VisitorRecord> {
        self.ctx.require_storage()?;

        let mut record = self.find(visitor_id).await?;
        if !record.is_banned() {
            return Err(DomainError::NotBanned.into());
        }

        record.unban();
        self.save(&record).await?;
        info!(visitor_id = %visitor_id, "Visitor unbanned");
        Ok(record)
    }

    /// Replace admin notes
    #[instrument(skip(self, request))]
    pub async fn update_notes(
        &self,
        visitor_id: VisitorId,
        request: UpdateNotesRequest,
    ) -> ServiceResult<VisitorRecord> {
        self.ctx.require_storage()?;

        let mut record = self.find(visitor_id).await?;
        record.admin_notes = request.notes.filter(|n| !n.trim().is_empty());
        self.save(&record).await?;
        Ok(record)
    }

    /// Delete a visitor; open ban pages see the removal as an unban
    #[instrument(skip(self))]
    pub async fn delete(&self, visitor_id: VisitorId) -> ServiceResult<()> {
        self.ctx.require_storage()?;

        if !self.ctx.visitor_repo().delete(visitor_id).await? {
            return Err(DomainError::VisitorNotFound(visitor_id).into());
        }

        if let Err(e) = self.ctx.notifier().visitor_changed(visitor_id, None).await {
            warn!(visitor_id = %visitor_id, error = %e, "Failed to publish visitor removal");
        }
        info!(visitor_id = %visitor_id, "Visitor deleted");
        Ok(())
    }

    /// Visitors, most recently seen first
    #[instrument(skip(self))]
    pub async fn list(&self, query: ListVisitorsQuery) -> ServiceResult<Vec<VisitorRecord>> {
        let status = match query.status.as_deref() {
            None | Some("") => None,
            Some("active") => Some(VisitorStatus::Active),
            Some("banned") => Some(VisitorStatus::Banned),
            Some(other) => {
                return Err(ServiceError::validation(format!("Unknown status filter: {other}")));
            }
        };
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

        Ok(self.ctx.visitor_repo().list(status, limit).await?)
    }

    /// Publish a new revision of a tier's design
    #[instrument(skip(self, request))]
    pub async fn upsert_design(
        &self,
        category: BanCategory,
        request: UpsertDesignRequest,
        changed_by: Option<String>,
    ) -> ServiceResult<BanPageDesign> {
        self.ctx.require_storage()?;

        if request.design.category != category {
            return Err(ServiceError::validation(format!(
                "Design category {} does not match {category}",
                request.design.category
            )));
        }
        request
            .design
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let previous = self.ctx.design_repo().find_by_category(category).await?;
        let design = request
            .design
            .revise(previous.as_ref(), request.summary, changed_by);

        self.ctx.design_repo().upsert(&design).await?;
        self.ctx.design_cache().put(design.clone());

        if let Err(e) = self.ctx.notifier().design_changed(&design).await {
            warn!(%category, error = %e, "Failed to publish design change");
        }
        info!(%category, version = design.version, "Design published");
        Ok(design)
    }

    /// Stored design per tier, or the default where none is stored
    #[instrument(skip(self))]
    pub async fn list_designs(&self) -> ServiceResult<Vec<BanPageDesign>> {
        let stored = self.ctx.design_repo().list().await?;
        Ok(BanCategory::ALL
            .iter()
            .map(|&category| {
                stored
                    .iter()
                    .find(|d| d.category == category)
                    .cloned()
                    .unwrap_or_else(|| folio_core::default_design(category))
            })
            .collect())
    }

    async fn find(&self, visitor_id: VisitorId) -> ServiceResult<VisitorRecord> {
        self.ctx
            .visitor_repo()
            .find_by_id(visitor_id)
            .await?
            .ok_or_else(|| DomainError::VisitorNotFound(visitor_id).into())
    }

    async fn save(&self, record: &VisitorRecord) -> ServiceResult<()> {
        self.ctx.visitor_repo().upsert(record).await?;
        if let Err(e) = self.ctx.notifier().visitor_changed(record.id, Some(record)).await {
            warn!(visitor_id = %record.id, error = %e, "Failed to publish visitor change");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::test_support::{memory_context, memory_context_with};
    use crate::services::context::ServiceContextBuilder;
    use folio_core::default_design;
    use folio_core::traits::{DesignRepository, VisitorRepository};

    fn ban_request(reason: &str) -> BanVisitorRequest {
        BanVisitorRequest {
            reason: reason.to_string(),
            category: None,
            severity: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_ban_classifies_reason_and_assigns_reference() {
        let (ctx, store) = memory_context();
        let id = VisitorId::generate();

        let record = ModerationService::new(&ctx)
            .ban(id, ban_request("Harassment"))
            .await
            .unwrap();

        assert!(record.is_banned());
        assert_eq!(record.ban_category, Some(BanCategory::Danger));
        assert!(is_valid_policy_reference(record.policy_reference.as_deref().unwrap()));
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap(), record);
    }

    #[tokio::test]
    async fn test_ban_explicit_category_and_severity() {
        let (ctx, _store) = memory_context();
        let service = ModerationService::new(&ctx);

        let mut request = ban_request("spam");
        request.category = Some("SEVERE".to_string());
        let record = service.ban(VisitorId::generate(), request).await.unwrap();
        assert_eq!(record.ban_category, Some(BanCategory::Severe));

        let mut request = ban_request("spam");
        request.severity = Some(6.4);
        let record = service.ban(VisitorId::generate(), request).await.unwrap();
        assert_eq!(record.ban_category, Some(BanCategory::Danger));

        let mut request = ban_request("spam");
        request.category = Some("purple".to_string());
        let err = service.ban(VisitorId::generate(), request).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_reban_keeps_existing_reference() {
        let (ctx, _store) = memory_context();
        let service = ModerationService::new(&ctx);
        let id = VisitorId::generate();

        let first = service.ban(id, ban_request("spam")).await.unwrap();
        service.unban(id).await.unwrap();
        let second = service.ban(id, ban_request("abuse")).await.unwrap();

        assert_eq!(first.policy_reference, second.policy_reference);
        assert_eq!(second.ban_category, Some(BanCategory::Severe));
    }

    #[tokio::test]
    async fn test_unban_requires_banned_visitor() {
        let (ctx, store) = memory_context();
        let service = ModerationService::new(&ctx);

        let err = service.unban(VisitorId::generate()).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let record = VisitorRecord::new(VisitorId::generate());
        store.put_visitor(record.clone()).await.unwrap();
        let err = service.unban(record.id).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_writes_need_storage() {
        let (ctx, _store) =
            memory_context_with(ServiceContextBuilder::new().storage_configured(false));
        let service = ModerationService::new(&ctx);

        let err = service
            .ban(VisitorId::generate(), ban_request("spam"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(service.delete(VisitorId::generate()).await.unwrap_err().status_code(), 503);
    }

    #[tokio::test]
    async fn test_delete_and_notes() {
        let (ctx, store) = memory_context();
        let service = ModerationService::new(&ctx);
        let record = VisitorRecord::new(VisitorId::generate());
        store.put_visitor(record.clone()).await.unwrap();

        let updated = service
            .update_notes(
                record.id,
                UpdateNotesRequest {
                    notes: Some("Repeat offender".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.admin_notes.as_deref(), Some("Repeat offender"));

        service.delete(record.id).await.unwrap();
        assert!(store.find_by_id(record.id).await.unwrap().is_none());
        assert_eq!(service.delete(record.id).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (ctx, _store) = memory_context();
        let service = ModerationService::new(&ctx);
        service.ban(VisitorId::generate(), ban_request("spam")).await.unwrap();
        ctx.visitor_repo()
            .upsert(&VisitorRecord::new(VisitorId::generate()))
            .await
            .unwrap();

        let banned = service
            .list(ListVisitorsQuery {
                status: Some("banned".to_string()),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(banned.len(), 1);

        let all = service.list(ListVisitorsQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let err = service
            .list(ListVisitorsQuery {
                status: Some("gone".to_string()),
                limit: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_upsert_design_versions_and_caches() {
        let (ctx, store) = memory_context();
        let service = ModerationService::new(&ctx);

        let mut design = default_design(BanCategory::Medium);
        design.content.title = "Hold on".to_string();
        let first = service
            .upsert_design(
                BanCategory::Medium,
                UpsertDesignRequest {
                    design: design.clone(),
                    summary: "New title".to_string(),
                },
                Some("admin".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(first.version, 1);

        let second = service
            .upsert_design(
                BanCategory::Medium,
                UpsertDesignRequest {
                    design,
                    summary: "Again".to_string(),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.changelog.len(), 2);

        let stored = store.find_by_category(BanCategory::Medium).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(
            ctx.design_cache().get(BanCategory::Medium).unwrap().version,
            2
        );
    }

    #[tokio::test]
    async fn test_upsert_design_rejects_mismatch_and_invalid() {
        let (ctx, _store) = memory_context();
        let service = ModerationService::new(&ctx);

        let err = service
            .upsert_design(
                BanCategory::Normal,
                UpsertDesignRequest {
                    design: default_design(BanCategory::Severe),
                    summary: "wrong tier".to_string(),
                },
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let mut design = default_design(BanCategory::Normal);
        design.theme.primary_color = "blue".to_string();
        let err = service
            .upsert_design(
                BanCategory::Normal,
                UpsertDesignRequest {
                    design,
                    summary: "bad color".to_string(),
                },
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_list_designs_fills_defaults() {
        let (ctx, _store) = memory_context();
        let designs = ModerationService::new(&ctx).list_designs().await.unwrap();
        assert_eq!(designs.len(), 4);
        assert_eq!(designs[3], default_design(BanCategory::Severe));
    }
}
