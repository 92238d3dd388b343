//! `DocumentFeed` over the shared subscriber.
//!
//! Each watch holds a lease on its channel; the first lease subscribes and
//! the last one to drop unsubscribes. Later leases wait for that first
//! SUBSCRIBE to be acknowledged. The stream joins the channel before reading
//! the current document, so no write between the two is lost.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::instrument;

use folio_core::traits::{DesignRepository, DocumentFeed, DocumentStream, RepoResult, VisitorRepository};
use folio_core::{
    BanCategory, BanPageDesign, DocumentChange, DocumentEvent, DomainError, VisitorId, VisitorRecord,
};

use crate::pubsub::{PubSubChannel, Subscriber, SubscriberEvent};

/// Live feed of visitor and design documents
#[derive(Clone)]
pub struct RedisDocumentFeed {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    subscriber: Arc<Subscriber>,
    visitors: Arc<dyn VisitorRepository>,
    designs: Arc<dyn DesignRepository>,
    leases: Mutex<HashMap<PubSubChannel, ChannelState>>,
}

impl RedisDocumentFeed {
    pub fn new(
        subscriber: Arc<Subscriber>,
        visitors: Arc<dyn VisitorRepository>,
        designs: Arc<dyn DesignRepository>,
    ) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                subscriber,
                visitors,
                designs,
                leases: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Number of open watches on a channel
    #[must_use]
    pub fn lease_count(&self, channel: &PubSubChannel) -> usize {
        self.inner.leases.lock().get(channel).map_or(0, |state| state.count)
    }

    async fn acquire(&self, channel: PubSubChannel) -> RepoResult<ChannelLease> {
        let join = join_channel(&mut self.inner.leases.lock(), channel);

        // On any failure below the lease drops and releases the count
        let lease = ChannelLease {
            inner: Arc::clone(&self.inner),
            channel,
        };

        match join {
            Join::Subscribe(ready) => {
                let result = self.inner.subscriber.subscribe(&[channel]).await;
                let _ = ready.send(Some(
                    result.as_ref().map(|_| ()).map_err(ToString::to_string),
                ));
                result?;
            }
            Join::Wait(ready) => wait_until_subscribed(ready, channel).await?,
        }

        Ok(lease)
    }
}

/// Outcome of the first SUBSCRIBE on a channel; `None` while it is in flight
type Readiness = Option<Result<(), String>>;

struct ChannelState {
    count: usize,
    ready: watch::Receiver<Readiness>,
}

enum Join {
    /// Send SUBSCRIBE and report the outcome
    Subscribe(watch::Sender<Readiness>),
    /// Another lease is subscribing
    Wait(watch::Receiver<Readiness>),
}

/// Count a new lease on `channel` and decide who subscribes.
///
/// A channel whose last SUBSCRIBE failed, or was abandoned before it
/// finished, is subscribed again by the next lease.
fn join_channel(leases: &mut HashMap<PubSubChannel, ChannelState>, channel: PubSubChannel) -> Join {
    let state = leases.entry(channel).or_insert_with(|| ChannelState {
        count: 0,
        ready: watch::channel(None).1,
    });
    state.count += 1;

    let outcome = state.ready.borrow().clone();
    let resubscribe = match outcome {
        Some(Ok(())) => false,
        Some(Err(_)) => true,
        None => state.ready.has_changed().is_err(),
    };

    if state.count == 1 || resubscribe {
        let (tx, rx) = watch::channel(None);
        state.ready = rx;
        Join::Subscribe(tx)
    } else {
        Join::Wait(state.ready.clone())
    }
}

async fn wait_until_subscribed(
    mut ready: watch::Receiver<Readiness>,
    channel: PubSubChannel,
) -> RepoResult<()> {
    let outcome = ready.wait_for(Option::is_some).await.map(|value| (*value).clone());
    match outcome {
        Ok(Some(Ok(()))) => Ok(()),
        Ok(Some(Err(message))) => Err(DomainError::CacheError(message)),
        Ok(None) | Err(_) => Err(DomainError::CacheError(format!(
            "subscribe to {channel} was abandoned"
        ))),
    }
}

/// Keeps a channel subscribed while a stream is alive
struct ChannelLease {
    inner: Arc<FeedInner>,
    channel: PubSubChannel,
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        let last = {
            let mut leases = self.inner.leases.lock();
            match leases.get_mut(&self.channel) {
                Some(state) if state.count > 1 => {
                    state.count -= 1;
                    false
                }
                Some(_) => {
                    leases.remove(&self.channel);
                    true
                }
                None => false,
            }
        };

        if last {
            if let Err(e) = self.inner.subscriber.try_unsubscribe(&[self.channel]) {
                tracing::warn!(channel = %self.channel, error = %e, "Failed to release channel");
            }
        }
    }
}

/// Turn subscriber events into a single-document stream.
///
/// Yields `initial` first, then every change on `channel` that `select`
/// maps to an event. A disconnect yields one `Error` and ends the stream.
fn document_stream<T, G>(
    rx: broadcast::Receiver<SubscriberEvent>,
    guard: G,
    channel: PubSubChannel,
    initial: DocumentEvent<T>,
    select: fn(DocumentChange) -> Option<DocumentEvent<T>>,
) -> DocumentStream<T>
where
    T: Send + 'static,
    G: Send + 'static,
{
    let rest = stream::unfold(Some((rx, guard)), move |state| {
        async move {
            let (mut rx, guard) = state?;
            loop {
                match rx.recv().await {
                    Ok(SubscriberEvent::Change { channel: from, change }) if from == channel => {
                        if let Some(event) = select(change) {
                            return Some((event, Some((rx, guard))));
                        }
                    }
                    Ok(SubscriberEvent::Change { .. }) => {}
                    Ok(SubscriberEvent::Disconnected(reason)) => {
                        return Some((DocumentEvent::Error(reason), None));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        return Some((
                            DocumentEvent::Error(format!("feed fell behind by {skipped} messages")),
                            None,
                        ));
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Some((DocumentEvent::Error("subscriber closed".to_string()), None));
                    }
                }
            }
        }
    });

    stream::once(async move { initial }).chain(rest).boxed()
}

#[async_trait]
impl DocumentFeed for RedisDocumentFeed {
    #[instrument(skip(self))]
    async fn watch_visitor(&self, id: VisitorId) -> RepoResult<DocumentStream<VisitorRecord>> {
        let channel = PubSubChannel::visitor(id);
        let rx = self.inner.subscriber.receiver();
        let lease = self.acquire(channel).await?;
        let initial = DocumentEvent::from_option(self.inner.visitors.find_by_id(id).await?);

        Ok(document_stream(
            rx,
            lease,
            channel,
            initial,
            DocumentChange::into_visitor_event,
        ))
    }

    #[instrument(skip(self))]
    async fn watch_design(&self, category: BanCategory) -> RepoResult<DocumentStream<BanPageDesign>> {
        let channel = PubSubChannel::design(category);
        let rx = self.inner.subscriber.receiver();
        let lease = self.acquire(channel).await?;
        let initial = DocumentEvent::from_option(self.inner.designs.find_by_category(category).await?);

        Ok(document_stream(
            rx,
            lease,
            channel,
            initial,
            DocumentChange::into_design_event,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(channel: PubSubChannel, change: DocumentChange) -> SubscriberEvent {
        SubscriberEvent::Change { channel, change }
    }

    #[tokio::test]
    async fn test_later_lease_waits_for_first_subscribe() {
        let mut leases = HashMap::new();
        let channel = PubSubChannel::visitor(VisitorId::generate());

        let Join::Subscribe(first) = join_channel(&mut leases, channel) else {
            panic!("first lease must subscribe");
        };
        let Join::Wait(ready) = join_channel(&mut leases, channel) else {
            panic!("second lease must wait");
        };
        assert_eq!(leases[&channel].count, 2);

        let waiter = tokio::spawn(wait_until_subscribed(ready, channel));
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        first.send(Some(Ok(()))).unwrap();
        waiter.await.unwrap().unwrap();

        // Already subscribed: later leases pass straight through
        let Join::Wait(ready) = join_channel(&mut leases, channel) else {
            panic!("subscribed channel must not subscribe again");
        };
        wait_until_subscribed(ready, channel).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_subscribe_reaches_waiters_and_is_retried() {
        let mut leases = HashMap::new();
        let channel = PubSubChannel::design(BanCategory::Danger);

        let Join::Subscribe(first) = join_channel(&mut leases, channel) else {
            panic!("first lease must subscribe");
        };
        let Join::Wait(ready) = join_channel(&mut leases, channel) else {
            panic!("second lease must wait");
        };
        first.send(Some(Err("connection refused".to_string()))).unwrap();

        let err = wait_until_subscribed(ready, channel).await.unwrap_err();
        assert!(matches!(err, DomainError::CacheError(message) if message == "connection refused"));

        assert!(matches!(join_channel(&mut leases, channel), Join::Subscribe(_)));
    }

    #[tokio::test]
    async fn test_abandoned_subscribe_fails_waiters() {
        let mut leases = HashMap::new();
        let channel = PubSubChannel::design(BanCategory::Normal);

        let Join::Subscribe(first) = join_channel(&mut leases, channel) else {
            panic!("first lease must subscribe");
        };
        let Join::Wait(ready) = join_channel(&mut leases, channel) else {
            panic!("second lease must wait");
        };
        drop(first);

        assert!(wait_until_subscribed(ready, channel).await.is_err());
        assert!(matches!(join_channel(&mut leases, channel), Join::Subscribe(_)));
    }

    #[tokio::test]
    async fn test_stream_yields_initial_then_matching_changes() {
        let (tx, rx) = broadcast::channel(16);
        let id = VisitorId::generate();
        let other = VisitorId::generate();
        let channel = PubSubChannel::visitor(id);

        let mut stream = document_stream(
            rx,
            (),
            channel,
            DocumentEvent::Removed,
            DocumentChange::into_visitor_event,
        );

        let mut banned = VisitorRecord::new(id);
        banned.ban("spam".to_string(), BanCategory::Normal, None);

        tx.send(message(
            PubSubChannel::visitor(other),
            DocumentChange::VisitorDeleted { visitor_id: other },
        ))
        .unwrap();
        tx.send(message(
            channel,
            DocumentChange::VisitorUpdated {
                record: banned.clone(),
            },
        ))
        .unwrap();
        tx.send(message(channel, DocumentChange::VisitorDeleted { visitor_id: id }))
            .unwrap();

        assert_eq!(stream.next().await, Some(DocumentEvent::Removed));
        match stream.next().await {
            Some(DocumentEvent::Snapshot(record)) => assert!(record.is_banned()),
            other => panic!("expected snapshot, got {other:?}"),
        }
        assert_eq!(stream.next().await, Some(DocumentEvent::Removed));
    }

    #[tokio::test]
    async fn test_stream_ends_after_disconnect() {
        let (tx, rx) = broadcast::channel(16);
        let mut stream = document_stream(
            rx,
            (),
            PubSubChannel::design(BanCategory::Normal),
            DocumentEvent::<BanPageDesign>::Removed,
            DocumentChange::into_design_event,
        );

        tx.send(SubscriberEvent::Disconnected("connection reset".to_string()))
            .unwrap();

        assert_eq!(stream.next().await, Some(DocumentEvent::Removed));
        assert_eq!(
            stream.next().await,
            Some(DocumentEvent::Error("connection reset".to_string()))
        );
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_stream_guard_dropped_with_stream() {
        let (_tx, rx) = broadcast::channel::<SubscriberEvent>(4);
        let guard = Arc::new(());
        let stream = document_stream(
            rx,
            Arc::clone(&guard),
            PubSubChannel::design(BanCategory::Severe),
            DocumentEvent::<VisitorRecord>::Removed,
            DocumentChange::into_visitor_event,
        );

        assert_eq!(Arc::strong_count(&guard), 2);
        drop(stream);
        assert_eq!(Arc::strong_count(&guard), 1);
    }
}
