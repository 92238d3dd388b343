//! Redis Pub/Sub publisher.
//!
//! Publishes document changes so live feeds in every process see them.

use async_trait::async_trait;
use redis::AsyncCommands;

use folio_core::traits::{ChangeNotifier, RepoResult};
use folio_core::{BanPageDesign, DocumentChange, VisitorId, VisitorRecord};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a change to a channel; returns the number of receivers
    pub async fn publish(&self, channel: &PubSubChannel, change: &DocumentChange) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();
        let payload = serde_json::to_string(change)?;

        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = change.event_type(),
            receivers = receivers,
            "Published change"
        );

        Ok(receivers)
    }
}

#[async_trait]
impl ChangeNotifier for Publisher {
    async fn visitor_changed(&self, id: VisitorId, record: Option<&VisitorRecord>) -> RepoResult<()> {
        let change = match record {
            Some(record) => DocumentChange::VisitorUpdated {
                record: record.clone(),
            },
            None => DocumentChange::VisitorDeleted { visitor_id: id },
        };
        self.publish(&PubSubChannel::visitor(id), &change).await?;
        Ok(())
    }

    async fn design_changed(&self, design: &BanPageDesign) -> RepoResult<()> {
        let change = DocumentChange::DesignUpdated {
            design: design.clone(),
        };
        self.publish(&PubSubChannel::design(design.category), &change)
            .await?;
        Ok(())
    }
}
