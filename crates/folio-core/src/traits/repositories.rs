//! Repository traits (ports) - define the interface for document access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL, in-memory, or offline).

use async_trait::async_trait;

use crate::entities::{Appeal, BanPageDesign, DeviceInfo, LocationInfo, VisitorRecord, VisitorStatus};
use crate::error::DomainError;
use crate::value_objects::{BanCategory, VisitorId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Visitor Repository
// ============================================================================

#[async_trait]
pub trait VisitorRepository: Send + Sync {
    /// Find a visitor document by id
    async fn find_by_id(&self, id: VisitorId) -> RepoResult<Option<VisitorRecord>>;

    /// Insert or replace a visitor document
    async fn upsert(&self, record: &VisitorRecord) -> RepoResult<()>;

    /// Apply a tracked visit, creating the visitor on first sight.
    ///
    /// Only the visit fields (device, location, counter, presence) are
    /// written; status and ban fields keep whatever is stored.
    async fn record_visit(
        &self,
        id: VisitorId,
        device: &DeviceInfo,
        location: Option<&LocationInfo>,
    ) -> RepoResult<VisitorRecord>;

    /// Update `online` and `last_seen` of a known visitor; returns whether it exists
    async fn touch(&self, id: VisitorId, online: bool) -> RepoResult<bool>;

    /// Store `reference` unless the visitor already holds a valid one.
    ///
    /// Returns the document as stored afterwards, `None` for unknown visitors.
    async fn set_policy_reference(
        &self,
        id: VisitorId,
        reference: &str,
    ) -> RepoResult<Option<VisitorRecord>>;

    /// Delete a visitor document; returns whether it existed
    async fn delete(&self, id: VisitorId) -> RepoResult<bool>;

    /// List visitors, most recently seen first
    async fn list(&self, status: Option<VisitorStatus>, limit: i64) -> RepoResult<Vec<VisitorRecord>>;
}

// ============================================================================
// Design Repository
// ============================================================================

#[async_trait]
pub trait DesignRepository: Send + Sync {
    /// Find the active design for a tier
    async fn find_by_category(&self, category: BanCategory) -> RepoResult<Option<BanPageDesign>>;

    /// Insert or replace the active design for `design.category`
    async fn upsert(&self, design: &BanPageDesign) -> RepoResult<()>;

    /// List all stored designs
    async fn list(&self) -> RepoResult<Vec<BanPageDesign>>;
}

// ============================================================================
// Appeal Repository
// ============================================================================

#[async_trait]
pub trait AppealRepository: Send + Sync {
    /// Store a new appeal
    async fn create(&self, appeal: &Appeal) -> RepoResult<()>;

    /// List appeals filed by a visitor, newest first
    async fn find_by_visitor(&self, visitor_id: VisitorId) -> RepoResult<Vec<Appeal>>;
}
