//! Visitor presence storage in Redis.
//!
//! A visitor is online while their presence key exists; the tracking beacon's
//! heartbeat refreshes the TTL, so a closed tab drops offline on its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use folio_core::traits::{PresenceTracker, RepoResult};
use folio_core::VisitorId;

use crate::pool::{RedisPool, RedisResult};

/// Key prefix for visitor presence
const PRESENCE_PREFIX: &str = "presence:";

/// Presence TTL (5 minutes - refreshed by heartbeat)
pub const PRESENCE_TTL: u64 = 300;

/// Visitor presence data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceData {
    pub visitor_id: VisitorId,
    /// Last heartbeat (Unix timestamp)
    pub updated_at: i64,
}

impl PresenceData {
    #[must_use]
    pub fn new(visitor_id: VisitorId) -> Self {
        Self {
            visitor_id,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Presence store backed by Redis
#[derive(Clone)]
pub struct PresenceStore {
    pool: RedisPool,
}

impl PresenceStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(visitor_id: VisitorId) -> String {
        format!("{PRESENCE_PREFIX}{visitor_id}")
    }

    /// Mark a visitor online (or refresh the TTL)
    pub async fn touch(&self, visitor_id: VisitorId) -> RedisResult<()> {
        let key = Self::key(visitor_id);
        let mut data = self
            .pool
            .get_json::<PresenceData>(&key)
            .await?
            .unwrap_or_else(|| PresenceData::new(visitor_id));
        data.updated_at = chrono::Utc::now().timestamp();
        self.pool.put_json_ex(&key, &data, PRESENCE_TTL).await
    }

    /// Mark a visitor offline
    pub async fn clear(&self, visitor_id: VisitorId) -> RedisResult<bool> {
        self.pool.remove(&Self::key(visitor_id)).await
    }

    /// Get presence data if the visitor is online
    pub async fn get(&self, visitor_id: VisitorId) -> RedisResult<Option<PresenceData>> {
        self.pool.get_json(&Self::key(visitor_id)).await
    }
}

#[async_trait]
impl PresenceTracker for PresenceStore {
    async fn set_online(&self, id: VisitorId, online: bool) -> RepoResult<()> {
        if online {
            self.touch(id).await?;
        } else {
            self.clear(id).await?;
        }
        tracing::trace!(visitor_id = %id, online, "Presence updated");
        Ok(())
    }

    async fn is_online(&self, id: VisitorId) -> RepoResult<bool> {
        Ok(self.get(id).await?.is_some())
    }
}
