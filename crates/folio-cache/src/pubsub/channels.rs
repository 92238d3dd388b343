//! Pub/Sub channel definitions.
//!
//! One channel per live document: `visitor:{uuid}` and `design:{category}`.

use folio_core::{BanCategory, VisitorId};

/// Channel prefix for visitor document changes
pub const VISITOR_CHANNEL_PREFIX: &str = "visitor:";
/// Channel prefix for design document changes
pub const DESIGN_CHANNEL_PREFIX: &str = "design:";

/// Channel of a single watched document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    Visitor(VisitorId),
    Design(BanCategory),
}

impl PubSubChannel {
    #[must_use]
    pub fn visitor(id: VisitorId) -> Self {
        Self::Visitor(id)
    }

    #[must_use]
    pub fn design(category: BanCategory) -> Self {
        Self::Design(category)
    }

    /// Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Visitor(id) => format!("{VISITOR_CHANNEL_PREFIX}{id}"),
            Self::Design(category) => format!("{DESIGN_CHANNEL_PREFIX}{category}"),
        }
    }

    /// Parse a channel name; anything that is not a document channel is `None`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(id) = name.strip_prefix(VISITOR_CHANNEL_PREFIX) {
            return id.parse().ok().map(Self::Visitor);
        }
        name.strip_prefix(DESIGN_CHANNEL_PREFIX)
            .and_then(|category| category.parse().ok())
            .map(Self::Design)
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
