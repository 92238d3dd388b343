//! # folio-cache
//!
//! Redis layer for visitor presence, change notifications, and live document feeds.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Presence**: Heartbeat-refreshed online flag per visitor
//! - **Pub/Sub**: Document change notifications across API and gateway processes
//! - **Live feed**: `DocumentFeed` built on the subscriber, seeded from the repositories
//!
//! ## Example
//!
//! ```ignore
//! use folio_cache::{Publisher, RedisDocumentFeed, RedisPool, RedisPoolConfig, SubscriberBuilder};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = Publisher::new(pool.clone());
//! let subscriber = SubscriberBuilder::new().redis_url("redis://127.0.0.1:6379").build().await?;
//! let feed = RedisDocumentFeed::new(subscriber, visitors, designs);
//!
//! let mut updates = feed.watch_visitor(visitor_id).await?;
//! ```

pub mod feed;
pub mod pool;
pub mod presence;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export presence types
pub use presence::{PresenceData, PresenceStore};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, Publisher, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberEvent, SubscriberResult, DESIGN_CHANNEL_PREFIX, VISITOR_CHANNEL_PREFIX,
};

// Re-export feed types
pub use feed::RedisDocumentFeed;
