//! Event names sent in the `t` field of dispatch frames

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BanPageEventType {
    /// Replace the panel with a freshly rendered view
    BanPageRender,
    /// Category is changing; a render follows
    BanPageTransitioning,
    /// Ban lifted; navigate away. Last event of the session.
    BanPageUnbanned,
    /// Live updates stopped. Last event of the session.
    BanPageConnectionLost,
}

impl BanPageEventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BanPageRender => "BAN_PAGE_RENDER",
            Self::BanPageTransitioning => "BAN_PAGE_TRANSITIONING",
            Self::BanPageUnbanned => "BAN_PAGE_UNBANNED",
            Self::BanPageConnectionLost => "BAN_PAGE_CONNECTION_LOST",
        }
    }

    /// Whether the session ends after this event
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::BanPageUnbanned | Self::BanPageConnectionLost)
    }
}

impl fmt::Display for BanPageEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
