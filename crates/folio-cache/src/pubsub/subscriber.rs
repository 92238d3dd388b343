//! Redis Pub/Sub subscriber.
//!
//! One background connection per process. Channels are added and removed
//! through a control queue; every received change is fanned out on a
//! broadcast channel that live feeds filter by channel name.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use folio_core::DocumentChange;
use futures_util::StreamExt;
use redis::Client;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

use crate::pubsub::PubSubChannel;

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<SubscriberError> for folio_core::DomainError {
    fn from(err: SubscriberError) -> Self {
        folio_core::DomainError::CacheError(err.to_string())
    }
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// What the subscriber fans out to its receivers
#[derive(Debug, Clone)]
pub enum SubscriberEvent {
    /// A document changed
    Change {
        channel: PubSubChannel,
        change: DocumentChange,
    },
    /// The Redis connection dropped; changes may have been missed
    Disconnected(String),
}

/// Decode a raw Pub/Sub message; foreign channels and bad payloads are `None`
fn decode(channel_name: &str, payload: &str) -> Option<SubscriberEvent> {
    let channel = PubSubChannel::parse(channel_name)?;
    match serde_json::from_str(payload) {
        Ok(change) => Some(SubscriberEvent::Change { channel, change }),
        Err(e) => {
            tracing::warn!(%channel, error = %e, "Dropping unparseable change");
            None
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Channel buffer size for broadcast
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
    /// How long `subscribe` waits for the listener to confirm
    pub ack_timeout_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
            ack_timeout_ms: 5000,
        }
    }
}

/// Redis Pub/Sub subscriber
pub struct Subscriber {
    config: SubscriberConfig,
    /// Currently subscribed channels
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<SubscriberEvent>,
    control_tx: mpsc::Sender<SubscriberCommand>,
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("receivers", &self.broadcast_tx.receiver_count())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum SubscriberCommand {
    Subscribe(Vec<String>, Option<oneshot::Sender<()>>),
    Unsubscribe(Vec<String>),
    Shutdown,
}

impl Subscriber {
    /// Create a new subscriber and start the background listener
    pub async fn new(config: SubscriberConfig) -> SubscriberResult<Self> {
        // Fail fast on a malformed URL; connection errors are retried by the loop
        Client::open(config.redis_url.as_str())?;

        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(256);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        let subscriber = Self {
            config: config.clone(),
            subscribed: subscribed.clone(),
            broadcast_tx: broadcast_tx.clone(),
            control_tx,
        };

        tokio::spawn(Self::listener_loop(
            config,
            subscribed,
            broadcast_tx,
            control_rx,
        ));

        Ok(subscriber)
    }

    async fn listener_loop(
        config: SubscriberConfig,
        subscribed: Arc<RwLock<HashSet<String>>>,
        broadcast_tx: broadcast::Sender<SubscriberEvent>,
        mut control_rx: mpsc::Receiver<SubscriberCommand>,
    ) {
        loop {
            match Self::run_listener(&config, &subscribed, &broadcast_tx, &mut control_rx).await {
                Ok(true) => {
                    tracing::info!("Subscriber shutting down");
                    break;
                }
                Ok(false) => {
                    let _ = broadcast_tx
                        .send(SubscriberEvent::Disconnected("pub/sub stream ended".to_string()));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Subscriber error, reconnecting...");
                    let _ = broadcast_tx.send(SubscriberEvent::Disconnected(e.to_string()));
                    tokio::time::sleep(Duration::from_millis(config.reconnect_delay_ms)).await;
                }
            }
        }
    }

    /// Run the listener until error or shutdown; `Ok(true)` means stop
    async fn run_listener(
        config: &SubscriberConfig,
        subscribed: &Arc<RwLock<HashSet<String>>>,
        broadcast_tx: &broadcast::Sender<SubscriberEvent>,
        control_rx: &mut mpsc::Receiver<SubscriberCommand>,
    ) -> SubscriberResult<bool> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        {
            let channels = subscribed.read().await;
            for channel in channels.iter() {
                pubsub.subscribe(channel).await?;
            }
        }

        tracing::info!("Subscriber connected to Redis");

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    match msg {
                        Some(msg) => {
                            let channel_name = msg.get_channel_name().to_string();
                            let payload: String = msg.get_payload().unwrap_or_default();
                            tracing::trace!(channel = %channel_name, "Received Pub/Sub message");

                            // No receivers is fine
                            if let Some(event) = decode(&channel_name, &payload) {
                                let _ = broadcast_tx.send(event);
                            }
                        }
                        None => {
                            tracing::warn!("Pub/Sub stream ended");
                            return Ok(false);
                        }
                    }
                }

                cmd = control_rx.recv() => {
                    match cmd {
                        Some(SubscriberCommand::Subscribe(channels, ack)) => {
                            drop(stream);
                            for channel in &channels {
                                pubsub.subscribe(channel).await?;
                                subscribed.write().await.insert(channel.clone());
                                tracing::debug!(channel = %channel, "Subscribed to channel");
                            }
                            if let Some(ack) = ack {
                                let _ = ack.send(());
                            }
                            stream = pubsub.on_message();
                        }
                        Some(SubscriberCommand::Unsubscribe(channels)) => {
                            drop(stream);
                            for channel in &channels {
                                subscribed.write().await.remove(channel);
                                if let Err(e) = pubsub.unsubscribe(channel).await {
                                    tracing::error!(channel = %channel, error = %e, "Failed to unsubscribe");
                                } else {
                                    tracing::debug!(channel = %channel, "Unsubscribed from channel");
                                }
                            }
                            stream = pubsub.on_message();
                        }
                        Some(SubscriberCommand::Shutdown) => {
                            return Ok(true);
                        }
                        None => {
                            tracing::warn!("Control channel closed");
                            return Ok(true);
                        }
                    }
                }
            }
        }
    }

    /// Subscribe to channels and wait until the listener has joined them
    pub async fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        let channel_names: Vec<String> = channels.iter().map(PubSubChannel::name).collect();
        let (ack_tx, ack_rx) = oneshot::channel();

        self.control_tx
            .send(SubscriberCommand::Subscribe(channel_names, Some(ack_tx)))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)?;

        match tokio::time::timeout(Duration::from_millis(self.config.ack_timeout_ms), ack_rx).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(SubscriberError::Connection(
                "listener dropped the subscription".to_string(),
            )),
            Err(_) => Err(SubscriberError::Connection(
                "subscription not acknowledged in time".to_string(),
            )),
        }
    }

    /// Unsubscribe from channels
    pub async fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        let channel_names: Vec<String> = channels.iter().map(PubSubChannel::name).collect();

        self.control_tx
            .send(SubscriberCommand::Unsubscribe(channel_names))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    /// Unsubscribe without waiting; used from `Drop`
    pub fn try_unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        let channel_names: Vec<String> = channels.iter().map(PubSubChannel::name).collect();

        self.control_tx
            .try_send(SubscriberCommand::Unsubscribe(channel_names))
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    /// Get a receiver for subscriber events
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<SubscriberEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Shutdown the subscriber
    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.control_tx
            .send(SubscriberCommand::Shutdown)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

/// Builder for subscriber
pub struct SubscriberBuilder {
    config: SubscriberConfig,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SubscriberConfig::default(),
        }
    }

    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    #[must_use]
    pub fn ack_timeout_ms(mut self, timeout: u64) -> Self {
        self.config.ack_timeout_ms = timeout;
        self
    }

    /// Start the subscriber; channels are joined later, one per watched document
    pub async fn build(self) -> SubscriberResult<Subscriber> {
        Subscriber::new(self.config).await
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}
