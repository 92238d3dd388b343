//! Visitor presence

mod visitor_presence;

pub use visitor_presence::{PresenceData, PresenceStore, PRESENCE_TTL};
