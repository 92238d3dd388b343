//! Offline store used when no database is configured
//!
//! Visitors read as unknown (and therefore active), designs fall back to the
//! built-in defaults, beacon writes are dropped with a warning, and writes
//! that would lose admin or visitor intent fail with `StorageUnavailable`.

use async_trait::async_trait;

use folio_core::entities::{
    Appeal, BanPageDesign, DeviceInfo, LocationInfo, VisitorRecord, VisitorStatus,
};
use folio_core::error::DomainError;
use folio_core::traits::{AppealRepository, DesignRepository, RepoResult, VisitorRepository};
use folio_core::value_objects::{BanCategory, VisitorId};

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineStore;

impl OfflineStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VisitorRepository for OfflineStore {
    async fn find_by_id(&self, _id: VisitorId) -> RepoResult<Option<VisitorRecord>> {
        Ok(None)
    }

    async fn upsert(&self, record: &VisitorRecord) -> RepoResult<()> {
        tracing::warn!(visitor_id = %record.id, "Database not configured, visitor write skipped");
        Ok(())
    }

    async fn record_visit(
        &self,
        id: VisitorId,
        device: &DeviceInfo,
        location: Option<&LocationInfo>,
    ) -> RepoResult<VisitorRecord> {
        tracing::warn!(visitor_id = %id, "Database not configured, visit not stored");
        let mut record = VisitorRecord::new(id);
        record.record_visit(device.clone(), location.cloned());
        Ok(record)
    }

    async fn touch(&self, _id: VisitorId, _online: bool) -> RepoResult<bool> {
        Ok(false)
    }

    async fn set_policy_reference(
        &self,
        _id: VisitorId,
        _reference: &str,
    ) -> RepoResult<Option<VisitorRecord>> {
        Ok(None)
    }

    async fn delete(&self, _id: VisitorId) -> RepoResult<bool> {
        Err(DomainError::StorageUnavailable)
    }

    async fn list(&self, _status: Option<VisitorStatus>, _limit: i64) -> RepoResult<Vec<VisitorRecord>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl DesignRepository for OfflineStore {
    async fn find_by_category(&self, _category: BanCategory) -> RepoResult<Option<BanPageDesign>> {
        Ok(None)
    }

    async fn upsert(&self, _design: &BanPageDesign) -> RepoResult<()> {
        Err(DomainError::StorageUnavailable)
    }

    async fn list(&self) -> RepoResult<Vec<BanPageDesign>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl AppealRepository for OfflineStore {
    async fn create(&self, _appeal: &Appeal) -> RepoResult<()> {
        Err(DomainError::StorageUnavailable)
    }

    async fn find_by_visitor(&self, _visitor_id: VisitorId) -> RepoResult<Vec<Appeal>> {
        Ok(Vec::new())
    }
}
