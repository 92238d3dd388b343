//! In-process document store
//!
//! Implements every repository trait plus the live document feed, change
//! notifier, and presence tracker, so a whole app can run without PostgreSQL
//! or Redis. Failure injection hooks let tests simulate an unreachable
//! database and broken subscriptions.

mod store;

pub use store::MemoryStore;
