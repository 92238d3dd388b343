//! Document events
//!
//! - `DocumentEvent` is what a live feed yields to a subscriber.
//! - `DocumentChange` is what writers publish so feeds in other processes
//!   can produce the next `DocumentEvent`.

use serde::{Deserialize, Serialize};

use crate::entities::{BanPageDesign, VisitorRecord};
use crate::value_objects::{BanCategory, VisitorId};

/// One item of a live single-document feed
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent<T> {
    /// Current contents of the document
    Snapshot(T),
    /// The document does not exist (never created, or deleted)
    Removed,
    /// The feed broke; no further events follow
    Error(String),
}

impl<T> DocumentEvent<T> {
    /// Build from a repository read result
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Removed, Self::Snapshot)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DocumentEvent<U> {
        match self {
            Self::Snapshot(v) => DocumentEvent::Snapshot(f(v)),
            Self::Removed => DocumentEvent::Removed,
            Self::Error(e) => DocumentEvent::Error(e),
        }
    }
}

/// Change notification published after a write
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentChange {
    VisitorUpdated { record: VisitorRecord },
    VisitorDeleted { visitor_id: VisitorId },
    DesignUpdated { design: BanPageDesign },
}

impl DocumentChange {
    /// Event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::VisitorUpdated { .. } => "VISITOR_UPDATED",
            Self::VisitorDeleted { .. } => "VISITOR_DELETED",
            Self::DesignUpdated { .. } => "DESIGN_UPDATED",
        }
    }

    /// Visitor this change concerns, if any
    pub fn visitor_id(&self) -> Option<VisitorId> {
        match self {
            Self::VisitorUpdated { record } => Some(record.id),
            Self::VisitorDeleted { visitor_id } => Some(*visitor_id),
            Self::DesignUpdated { .. } => None,
        }
    }

    /// Design tier this change concerns, if any
    pub fn category(&self) -> Option<BanCategory> {
        match self {
            Self::DesignUpdated { design } => Some(design.category),
            _ => None,
        }
    }

    /// Feed event for a visitor subscriber
    pub fn into_visitor_event(self) -> Option<DocumentEvent<VisitorRecord>> {
        match self {
            Self::VisitorUpdated { record } => Some(DocumentEvent::Snapshot(record)),
            Self::VisitorDeleted { .. } => Some(DocumentEvent::Removed),
            Self::DesignUpdated { .. } => None,
        }
    }

    /// Feed event for a design subscriber
    pub fn into_design_event(self) -> Option<DocumentEvent<BanPageDesign>> {
        match self {
            Self::DesignUpdated { design } => Some(DocumentEvent::Snapshot(design)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_design;

    #[test]
    fn test_from_option() {
        assert_eq!(DocumentEvent::from_option(Some(1)), DocumentEvent::Snapshot(1));
        assert_eq!(DocumentEvent::<i32>::from_option(None), DocumentEvent::Removed);
    }

    #[test]
    fn test_change_serialization_is_tagged() {
        let id = VisitorId::generate();
        let change = DocumentChange::VisitorDeleted { visitor_id: id };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["type"], "VISITOR_DELETED");
        assert_eq!(change.event_type(), "VISITOR_DELETED");

        let parsed: DocumentChange = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.visitor_id(), Some(id));
        assert_eq!(parsed.into_visitor_event(), Some(DocumentEvent::Removed));
    }

    #[test]
    fn test_design_change_routes_to_design_feed() {
        let change = DocumentChange::DesignUpdated {
            design: default_design(BanCategory::Severe),
        };
        assert_eq!(change.category(), Some(BanCategory::Severe));
        assert!(change.clone().into_visitor_event().is_none());
        assert!(matches!(
            change.into_design_event(),
            Some(DocumentEvent::Snapshot(d)) if d.category == BanCategory::Severe
        ));
    }
}
