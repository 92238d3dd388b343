//! Memory store implementation

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use folio_core::entities::{
    Appeal, BanPageDesign, DeviceInfo, LocationInfo, VisitorRecord, VisitorStatus,
};
use folio_core::error::DomainError;
use folio_core::is_valid_policy_reference;
use folio_core::events::{DocumentChange, DocumentEvent};
use folio_core::traits::{
    AppealRepository, ChangeNotifier, DesignRepository, DocumentFeed, DocumentStream,
    PresenceTracker, RepoResult, VisitorRepository,
};
use folio_core::value_objects::{BanCategory, VisitorId};

const SIGNAL_CAPACITY: usize = 256;

/// What live feeds receive from the store
#[derive(Debug, Clone)]
enum StoreSignal {
    Change(DocumentChange),
    /// Every open feed fails with this message
    Break(String),
}

#[derive(Default)]
struct Documents {
    visitors: HashMap<VisitorId, VisitorRecord>,
    designs: HashMap<BanCategory, BanPageDesign>,
    appeals: Vec<Appeal>,
    presence: HashMap<VisitorId, bool>,
}

struct Inner {
    documents: RwLock<Documents>,
    signals: broadcast::Sender<StoreSignal>,
    unreachable: AtomicBool,
}

/// Shared in-memory store; clones share the same documents
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                documents: RwLock::new(Documents::default()),
                signals,
                unreachable: AtomicBool::new(false),
            }),
        }
    }

    // ========================================================================
    // Failure injection
    // ========================================================================

    /// Make every read, write, and new subscription fail
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Fail every open feed with `message`
    pub fn break_feeds(&self, message: &str) {
        let _ = self.inner.signals.send(StoreSignal::Break(message.to_string()));
    }

    /// Number of open feeds
    pub fn feed_count(&self) -> usize {
        self.inner.signals.receiver_count()
    }

    // ========================================================================
    // Convenience writers (write + notify)
    // ========================================================================

    /// Store a visitor document and notify feeds
    pub async fn put_visitor(&self, record: VisitorRecord) -> RepoResult<()> {
        VisitorRepository::upsert(self, &record).await?;
        self.visitor_changed(record.id, Some(&record)).await
    }

    /// Store a design document and notify feeds
    pub async fn put_design(&self, design: BanPageDesign) -> RepoResult<()> {
        DesignRepository::upsert(self, &design).await?;
        self.design_changed(&design).await
    }

    fn check_reachable(&self) -> RepoResult<()> {
        if self.inner.unreachable.load(Ordering::SeqCst) {
            Err(DomainError::DatabaseError("memory store unreachable".to_string()))
        } else {
            Ok(())
        }
    }

    fn emit(&self, change: DocumentChange) {
        tracing::debug!(event_type = change.event_type(), "Memory store change");
        // No receivers is not an error
        let _ = self.inner.signals.send(StoreSignal::Change(change));
    }

    /// Build a feed: current state first, then every matching change.
    /// The receiver is taken before `current` runs so no change is missed.
    fn feed<T, C, F>(&self, current: C, select: F) -> DocumentStream<T>
    where
        T: Send + 'static,
        C: Fn(&MemoryStore) -> DocumentEvent<T> + Send + Sync + 'static,
        F: Fn(DocumentChange) -> Option<DocumentEvent<T>> + Send + Sync + 'static,
    {
        let rx = self.inner.signals.subscribe();
        let initial = current(self);
        let store = self.clone();

        let updates = stream::unfold(
            (rx, store, current, select, false),
            |(mut rx, store, current, select, done)| async move {
                if done {
                    return None;
                }
                loop {
                    match rx.recv().await {
                        Ok(StoreSignal::Change(change)) => {
                            if let Some(event) = select(change) {
                                return Some((event, (rx, store, current, select, false)));
                            }
                        }
                        Ok(StoreSignal::Break(message)) => {
                            return Some((
                                DocumentEvent::Error(message),
                                (rx, store, current, select, true),
                            ));
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Feed lagged, resyncing from store");
                            let event = current(&store);
                            return Some((event, (rx, store, current, select, false)));
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            },
        );

        stream::once(async move { initial }).chain(updates).boxed()
    }
}

// ============================================================================
// Repositories
// ============================================================================

#[async_trait]
impl VisitorRepository for MemoryStore {
    async fn find_by_id(&self, id: VisitorId) -> RepoResult<Option<VisitorRecord>> {
        self.check_reachable()?;
        Ok(self.inner.documents.read().visitors.get(&id).cloned())
    }

    async fn upsert(&self, record: &VisitorRecord) -> RepoResult<()> {
        self.check_reachable()?;
        self.inner
            .documents
            .write()
            .visitors
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn record_visit(
        &self,
        id: VisitorId,
        device: &DeviceInfo,
        location: Option<&LocationInfo>,
    ) -> RepoResult<VisitorRecord> {
        self.check_reachable()?;
        let mut documents = self.inner.documents.write();
        let record = documents
            .visitors
            .entry(id)
            .or_insert_with(|| VisitorRecord::new(id));
        record.record_visit(device.clone(), location.cloned());
        Ok(record.clone())
    }

    async fn touch(&self, id: VisitorId, online: bool) -> RepoResult<bool> {
        self.check_reachable()?;
        let mut documents = self.inner.documents.write();
        match documents.visitors.get_mut(&id) {
            Some(record) => {
                record.touch(online);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_policy_reference(
        &self,
        id: VisitorId,
        reference: &str,
    ) -> RepoResult<Option<VisitorRecord>> {
        self.check_reachable()?;
        let mut documents = self.inner.documents.write();
        let Some(record) = documents.visitors.get_mut(&id) else {
            return Ok(None);
        };
        let holds_valid = record
            .policy_reference
            .as_deref()
            .is_some_and(is_valid_policy_reference);
        if !holds_valid {
            record.policy_reference = Some(reference.to_string());
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: VisitorId) -> RepoResult<bool> {
        self.check_reachable()?;
        Ok(self.inner.documents.write().visitors.remove(&id).is_some())
    }

    async fn list(&self, status: Option<VisitorStatus>, limit: i64) -> RepoResult<Vec<VisitorRecord>> {
        self.check_reachable()?;
        let documents = self.inner.documents.read();
        let mut records: Vec<VisitorRecord> = documents
            .visitors
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        records.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(records)
    }
}

#[async_trait]
impl DesignRepository for MemoryStore {
    async fn find_by_category(&self, category: BanCategory) -> RepoResult<Option<BanPageDesign>> {
        self.check_reachable()?;
        Ok(self.inner.documents.read().designs.get(&category).cloned())
    }

    async fn upsert(&self, design: &BanPageDesign) -> RepoResult<()> {
        self.check_reachable()?;
        self.inner
            .documents
            .write()
            .designs
            .insert(design.category, design.clone());
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<BanPageDesign>> {
        self.check_reachable()?;
        let mut designs: Vec<BanPageDesign> =
            self.inner.documents.read().designs.values().cloned().collect();
        designs.sort_by_key(|d| d.category);
        Ok(designs)
    }
}

#[async_trait]
impl AppealRepository for MemoryStore {
    async fn create(&self, appeal: &Appeal) -> RepoResult<()> {
        self.check_reachable()?;
        self.inner.documents.write().appeals.push(appeal.clone());
        Ok(())
    }

    async fn find_by_visitor(&self, visitor_id: VisitorId) -> RepoResult<Vec<Appeal>> {
        self.check_reachable()?;
        let documents = self.inner.documents.read();
        Ok(documents
            .appeals
            .iter()
            .rev()
            .filter(|a| a.visitor_id == visitor_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Feed, notifier, presence
// ============================================================================

#[async_trait]
impl DocumentFeed for MemoryStore {
    async fn watch_visitor(&self, id: VisitorId) -> RepoResult<DocumentStream<VisitorRecord>> {
        self.check_reachable()?;
        Ok(self.feed(
            move |store| {
                DocumentEvent::from_option(store.inner.documents.read().visitors.get(&id).cloned())
            },
            move |change| {
                if change.visitor_id() == Some(id) {
                    change.into_visitor_event()
                } else {
                    None
                }
            },
        ))
    }

    async fn watch_design(&self, category: BanCategory) -> RepoResult<DocumentStream<BanPageDesign>> {
        self.check_reachable()?;
        Ok(self.feed(
            move |store| {
                DocumentEvent::from_option(
                    store.inner.documents.read().designs.get(&category).cloned(),
                )
            },
            move |change| {
                if change.category() == Some(category) {
                    change.into_design_event()
                } else {
                    None
                }
            },
        ))
    }
}

#[async_trait]
impl ChangeNotifier for MemoryStore {
    async fn visitor_changed(&self, id: VisitorId, record: Option<&VisitorRecord>) -> RepoResult<()> {
        let change = match record {
            Some(record) => DocumentChange::VisitorUpdated {
                record: record.clone(),
            },
            None => DocumentChange::VisitorDeleted { visitor_id: id },
        };
        self.emit(change);
        Ok(())
    }

    async fn design_changed(&self, design: &BanPageDesign) -> RepoResult<()> {
        self.emit(DocumentChange::DesignUpdated {
            design: design.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl PresenceTracker for MemoryStore {
    async fn set_online(&self, id: VisitorId, online: bool) -> RepoResult<()> {
        self.inner.documents.write().presence.insert(id, online);
        Ok(())
    }

    async fn is_online(&self, id: VisitorId) -> RepoResult<bool> {
        Ok(self
            .inner
            .documents
            .read()
            .presence
            .get(&id)
            .copied()
            .unwrap_or(false))
    }
}
