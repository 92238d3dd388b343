//! Live document feeds, change notification, and presence

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::entities::{BanPageDesign, VisitorRecord};
use crate::events::DocumentEvent;
use crate::traits::RepoResult;
use crate::value_objects::{BanCategory, VisitorId};

/// Stream of events for a single document.
///
/// The first item is the document's current state. Dropping the stream
/// releases the underlying subscription.
pub type DocumentStream<T> = BoxStream<'static, DocumentEvent<T>>;

/// Source of live single-document subscriptions
#[async_trait]
pub trait DocumentFeed: Send + Sync {
    /// Watch one visitor document
    async fn watch_visitor(&self, id: VisitorId) -> RepoResult<DocumentStream<VisitorRecord>>;

    /// Watch the design document of one tier
    async fn watch_design(&self, category: BanCategory) -> RepoResult<DocumentStream<BanPageDesign>>;
}

/// Notified after every successful document write
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// A visitor document was written (`Some`) or deleted (`None`)
    async fn visitor_changed(&self, id: VisitorId, record: Option<&VisitorRecord>) -> RepoResult<()>;

    /// A design document was written
    async fn design_changed(&self, design: &BanPageDesign) -> RepoResult<()>;
}

/// Short-lived online flag per visitor
#[async_trait]
pub trait PresenceTracker: Send + Sync {
    async fn set_online(&self, id: VisitorId, online: bool) -> RepoResult<()>;

    async fn is_online(&self, id: VisitorId) -> RepoResult<bool>;
}
