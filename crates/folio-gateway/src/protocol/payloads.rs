//! Protocol payloads

use serde::{Deserialize, Serialize};

/// Default client heartbeat period in milliseconds
pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 45_000;

/// Hello payload (op=10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_interval(DEFAULT_HEARTBEAT_INTERVAL)
    }

    #[must_use]
    pub const fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::new()
    }
}
