//! Live single-document feeds backed by Redis Pub/Sub.

mod redis_feed;

pub use redis_feed::RedisDocumentFeed;
