//! Visitor status listener
//!
//! Watches one visitor document and reports what a ban page has to react to:
//! the ban being lifted, the category changing, a policy reference becoming
//! known, or the live feed breaking. `StatusTracker` holds the diffing rules;
//! `StatusListener` drives it from the document feed on a background task.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use folio_core::{BanCategory, DocumentEvent, VisitorId, VisitorRecord};

use super::context::ServiceContext;
use super::policy::PolicyReferenceService;

// ============================================================================
// Tracker
// ============================================================================

/// Something the page must react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSignal {
    /// The visitor is no longer banned (or their document is gone)
    Unbanned,
    CategoryChanged(BanCategory),
    PolicyReference(String),
    /// No reference is known anywhere; one should be fetched or generated
    FetchPolicyReference,
    ConnectionLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerState {
    Initial,
    Listening,
    Unbanned,
    Failed,
}

/// Diffs successive visitor snapshots against what the page already shows
#[derive(Debug, Clone)]
pub struct StatusTracker {
    state: TrackerState,
    category: BanCategory,
    policy_reference: Option<String>,
    /// A `FetchPolicyReference` is out and not yet resolved
    fetch_in_flight: bool,
}

impl StatusTracker {
    /// Start from what the page rendered initially
    pub fn new(category: BanCategory, policy_reference: Option<String>) -> Self {
        Self {
            state: TrackerState::Initial,
            category,
            policy_reference,
            fetch_in_flight: false,
        }
    }

    pub fn category(&self) -> BanCategory {
        self.category
    }

    pub fn policy_reference(&self) -> Option<&str> {
        self.policy_reference.as_deref()
    }

    pub fn is_listening(&self) -> bool {
        self.state == TrackerState::Listening
    }

    /// Unbanned or failed; no further signals follow
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TrackerState::Unbanned | TrackerState::Failed)
    }

    /// Feed one document event
    pub fn observe(&mut self, event: DocumentEvent<VisitorRecord>) -> Vec<StatusSignal> {
        if self.is_terminal() {
            return Vec::new();
        }

        match event {
            DocumentEvent::Removed => self.finish_unbanned(),
            DocumentEvent::Error(_) => {
                self.state = TrackerState::Failed;
                vec![StatusSignal::ConnectionLost]
            }
            DocumentEvent::Snapshot(record) if !record.is_banned() => self.finish_unbanned(),
            DocumentEvent::Snapshot(record) => {
                self.state = TrackerState::Listening;
                let mut signals = Vec::new();

                let category = record.effective_category();
                if category != self.category {
                    self.category = category;
                    signals.push(StatusSignal::CategoryChanged(category));
                }

                match record.policy_reference {
                    Some(reference) if self.policy_reference.as_ref() != Some(&reference) => {
                        self.policy_reference = Some(reference.clone());
                        signals.push(StatusSignal::PolicyReference(reference));
                    }
                    Some(_) => {}
                    None => {
                        if self.policy_reference.is_none() && !self.fetch_in_flight {
                            self.fetch_in_flight = true;
                            signals.push(StatusSignal::FetchPolicyReference);
                        }
                    }
                }

                signals
            }
        }
    }

    /// Result of a fetch started by `FetchPolicyReference`.
    /// A failed fetch lets the next snapshot without a reference ask again.
    pub fn policy_reference_resolved(&mut self, reference: Option<String>) -> Vec<StatusSignal> {
        self.fetch_in_flight = false;
        if self.is_terminal() {
            return Vec::new();
        }
        match reference {
            Some(reference) if self.policy_reference.is_none() => {
                self.policy_reference = Some(reference.clone());
                vec![StatusSignal::PolicyReference(reference)]
            }
            _ => Vec::new(),
        }
    }

    fn finish_unbanned(&mut self) -> Vec<StatusSignal> {
        self.state = TrackerState::Unbanned;
        vec![StatusSignal::Unbanned]
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Receives listener callbacks
#[async_trait]
pub trait StatusHandler: Send + Sync + 'static {
    async fn on_unban(&self);

    async fn on_category_change(&self, _category: BanCategory) {}

    async fn on_policy_reference(&self, _reference: String) {}

    async fn on_connection_lost(&self);
}

/// Forward callbacks as signals
#[async_trait]
impl StatusHandler for mpsc::UnboundedSender<StatusSignal> {
    async fn on_unban(&self) {
        let _ = self.send(StatusSignal::Unbanned);
    }

    async fn on_category_change(&self, category: BanCategory) {
        let _ = self.send(StatusSignal::CategoryChanged(category));
    }

    async fn on_policy_reference(&self, reference: String) {
        let _ = self.send(StatusSignal::PolicyReference(reference));
    }

    async fn on_connection_lost(&self) {
        let _ = self.send(StatusSignal::ConnectionLost);
    }
}

// ============================================================================
// Listener
// ============================================================================

/// Spawns status watches
#[derive(Clone)]
pub struct StatusListener {
    ctx: ServiceContext,
}

impl StatusListener {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Watch `visitor_id` until unbanned, the feed breaks, or the handle is dropped
    pub fn watch<H: StatusHandler>(
        &self,
        visitor_id: VisitorId,
        category: BanCategory,
        policy_reference: Option<String>,
        handler: H,
    ) -> ListenerHandle {
        let tracker = StatusTracker::new(category, policy_reference);
        let task = tokio::spawn(run_listener(self.ctx.clone(), visitor_id, tracker, handler));
        ListenerHandle { task: Some(task) }
    }
}

#[instrument(skip(ctx, tracker, handler))]
async fn run_listener<H: StatusHandler>(
    ctx: ServiceContext,
    visitor_id: VisitorId,
    mut tracker: StatusTracker,
    handler: H,
) {
    let mut stream = match ctx.feed().watch_visitor(visitor_id).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "Could not open visitor feed");
            handler.on_connection_lost().await;
            return;
        }
    };
    debug!("Listening for status changes");

    let (reference_tx, mut reference_rx) = mpsc::channel::<Option<String>>(1);
    let mut fetch: Option<JoinHandle<()>> = None;

    loop {
        let signals = tokio::select! {
            event = stream.next() => {
                let event = event.unwrap_or_else(|| DocumentEvent::Error("feed closed".to_string()));
                if let DocumentEvent::Error(message) = &event {
                    warn!(error = %message, "Visitor feed broke");
                }
                tracker.observe(event)
            }
            Some(reference) = reference_rx.recv() => tracker.policy_reference_resolved(reference),
        };

        for signal in signals {
            match signal {
                StatusSignal::Unbanned => {
                    info!("Visitor unbanned");
                    handler.on_unban().await;
                }
                StatusSignal::CategoryChanged(category) => {
                    info!(%category, "Ban category changed");
                    handler.on_category_change(category).await;
                }
                StatusSignal::PolicyReference(reference) => handler.on_policy_reference(reference).await,
                StatusSignal::ConnectionLost => handler.on_connection_lost().await,
                StatusSignal::FetchPolicyReference => {
                    let ctx = ctx.clone();
                    let reference_tx = reference_tx.clone();
                    fetch = Some(tokio::spawn(async move {
                        let reference = PolicyReferenceService::new(&ctx)
                            .fetch_or_generate(visitor_id)
                            .await;
                        let _ = reference_tx.send(reference).await;
                    }));
                }
            }
        }

        if tracker.is_terminal() {
            break;
        }
    }

    if let Some(fetch) = fetch {
        fetch.abort();
    }
}

/// Owns a running watch; dropping it stops the watch and releases the feed
#[derive(Debug)]
pub struct ListenerHandle {
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stop watching
    pub fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// The watch reached a terminal state or was stopped
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::test_support::memory_context;
    use std::time::Duration;
    use tokio::time::timeout;

    fn banned(category: BanCategory, reference: Option<&str>) -> VisitorRecord {
        let mut record = VisitorRecord::new(VisitorId::generate());
        record.ban("spam".to_string(), category, reference.map(str::to_string));
        record
    }

    fn snapshot(record: &VisitorRecord) -> DocumentEvent<VisitorRecord> {
        DocumentEvent::Snapshot(record.clone())
    }

    // ------------------------------------------------------------------------
    // Tracker
    // ------------------------------------------------------------------------

    #[test]
    fn test_active_snapshot_unbans_once() {
        let mut tracker = StatusTracker::new(BanCategory::Normal, Some("PR-1234".to_string()));
        let mut record = banned(BanCategory::Normal, Some("PR-1234"));
        assert!(tracker.observe(snapshot(&record)).is_empty());
        assert!(tracker.is_listening());

        record.unban();
        assert_eq!(tracker.observe(snapshot(&record)), vec![StatusSignal::Unbanned]);
        assert!(tracker.is_terminal());

        // Redundant snapshots never re-fire
        assert!(tracker.observe(snapshot(&record)).is_empty());
        assert!(tracker.observe(DocumentEvent::Removed).is_empty());
    }

    #[test]
    fn test_missing_document_counts_as_unban() {
        let mut tracker = StatusTracker::new(BanCategory::Danger, None);
        assert_eq!(tracker.observe(DocumentEvent::Removed), vec![StatusSignal::Unbanned]);
    }

    #[test]
    fn test_category_change_fires_only_on_change() {
        let mut tracker = StatusTracker::new(BanCategory::Normal, Some("PR-1234".to_string()));
        let mut record = banned(BanCategory::Normal, Some("PR-1234"));
        assert!(tracker.observe(snapshot(&record)).is_empty());

        record.ban_category = Some(BanCategory::Danger);
        assert_eq!(
            tracker.observe(snapshot(&record)),
            vec![StatusSignal::CategoryChanged(BanCategory::Danger)]
        );
        assert!(tracker.observe(snapshot(&record)).is_empty());
        assert_eq!(tracker.category(), BanCategory::Danger);
    }

    #[test]
    fn test_category_falls_back_to_reason() {
        let mut tracker = StatusTracker::new(BanCategory::Normal, Some("PR-1234".to_string()));
        let mut record = banned(BanCategory::Normal, Some("PR-1234"));
        record.ban_category = None;
        record.ban_reason = Some("Hate speech".to_string());
        assert_eq!(
            tracker.observe(snapshot(&record)),
            vec![StatusSignal::CategoryChanged(BanCategory::Danger)]
        );
    }

    #[test]
    fn test_policy_reference_changes() {
        let mut tracker = StatusTracker::new(BanCategory::Normal, Some("PR-AAAA".to_string()));
        let mut record = banned(BanCategory::Normal, Some("PR-AAAA"));
        assert!(tracker.observe(snapshot(&record)).is_empty());

        record.policy_reference = Some("PR-BBBB".to_string());
        assert_eq!(
            tracker.observe(snapshot(&record)),
            vec![StatusSignal::PolicyReference("PR-BBBB".to_string())]
        );
        assert_eq!(tracker.policy_reference(), Some("PR-BBBB"));
    }

    #[test]
    fn test_missing_reference_requests_one_fetch() {
        let mut tracker = StatusTracker::new(BanCategory::Normal, None);
        let record = banned(BanCategory::Normal, None);

        assert_eq!(
            tracker.observe(snapshot(&record)),
            vec![StatusSignal::FetchPolicyReference]
        );
        assert!(tracker.observe(snapshot(&record)).is_empty());

        assert_eq!(
            tracker.policy_reference_resolved(Some("PR-NEW1".to_string())),
            vec![StatusSignal::PolicyReference("PR-NEW1".to_string())]
        );

        // The stored copy arriving later is not news
        let mut stored = record.clone();
        stored.policy_reference = Some("PR-NEW1".to_string());
        assert!(tracker.observe(snapshot(&stored)).is_empty());
    }

    #[test]
    fn test_failed_fetch_keeps_placeholder() {
        let mut tracker = StatusTracker::new(BanCategory::Normal, None);
        let record = banned(BanCategory::Normal, None);
        tracker.observe(snapshot(&record));
        assert!(tracker.policy_reference_resolved(None).is_empty());
        assert_eq!(tracker.policy_reference(), None);

        // The next snapshot still lacking one asks again
        assert_eq!(
            tracker.observe(snapshot(&record)),
            vec![StatusSignal::FetchPolicyReference]
        );
        assert!(tracker.observe(snapshot(&record)).is_empty());
    }

    #[test]
    fn test_error_is_terminal() {
        let mut tracker = StatusTracker::new(BanCategory::Normal, None);
        assert_eq!(
            tracker.observe(DocumentEvent::Error("reset".to_string())),
            vec![StatusSignal::ConnectionLost]
        );
        assert!(tracker.is_terminal());
        assert!(tracker.observe(DocumentEvent::Removed).is_empty());
    }

    // ------------------------------------------------------------------------
    // Listener over the memory store
    // ------------------------------------------------------------------------

    async fn next_signal(rx: &mut mpsc::UnboundedReceiver<StatusSignal>) -> Option<StatusSignal> {
        timeout(Duration::from_secs(2), rx.recv()).await.ok().flatten()
    }

    #[tokio::test]
    async fn test_listener_reports_unban() {
        let (ctx, store) = memory_context();
        let mut record = banned(BanCategory::Medium, Some("PR-1234"));
        store.put_visitor(record.clone()).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = StatusListener::new(&ctx).watch(
            record.id,
            BanCategory::Medium,
            Some("PR-1234".to_string()),
            tx,
        );

        record.unban();
        store.put_visitor(record).await.unwrap();

        assert_eq!(next_signal(&mut rx).await, Some(StatusSignal::Unbanned));
        // Terminal: the task ends and drops its sender
        assert_eq!(next_signal(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_listener_generates_missing_reference() {
        let (ctx, store) = memory_context();
        let record = banned(BanCategory::Normal, None);
        store.put_visitor(record.clone()).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = StatusListener::new(&ctx).watch(record.id, BanCategory::Normal, None, tx);

        match next_signal(&mut rx).await {
            Some(StatusSignal::PolicyReference(reference)) => {
                assert!(folio_core::is_valid_policy_reference(&reference));
            }
            other => panic!("expected policy reference, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_listener_reports_connection_lost_once() {
        let (ctx, store) = memory_context();
        let record = banned(BanCategory::Danger, Some("PR-1234"));
        store.put_visitor(record.clone()).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = StatusListener::new(&ctx).watch(
            record.id,
            BanCategory::Danger,
            Some("PR-1234".to_string()),
            tx,
        );

        // Let the listener subscribe before breaking the feed
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.break_feeds("connection reset");

        assert_eq!(next_signal(&mut rx).await, Some(StatusSignal::ConnectionLost));
        assert_eq!(next_signal(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_feed_reports_connection_lost() {
        let (ctx, store) = memory_context();
        store.set_unreachable(true);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle =
            StatusListener::new(&ctx).watch(VisitorId::generate(), BanCategory::Normal, None, tx);

        assert_eq!(next_signal(&mut rx).await, Some(StatusSignal::ConnectionLost));
    }

    #[tokio::test]
    async fn test_dropping_handle_releases_feed() {
        let (ctx, store) = memory_context();
        let record = banned(BanCategory::Normal, Some("PR-1234"));
        store.put_visitor(record.clone()).await.unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = StatusListener::new(&ctx).watch(
            record.id,
            BanCategory::Normal,
            Some("PR-1234".to_string()),
            tx,
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.feed_count(), 1);

        handle.unsubscribe();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.feed_count(), 0);
    }
}
