//! Redis Pub/Sub module.
//!
//! Writers publish `DocumentChange` notifications; live feeds in any process
//! subscribe to the channels of the documents they watch.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, DESIGN_CHANNEL_PREFIX, VISITOR_CHANNEL_PREFIX};
pub use publisher::Publisher;
pub use subscriber::{
    Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError, SubscriberEvent,
    SubscriberResult,
};
