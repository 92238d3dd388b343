//! Traits (ports) implemented by the infrastructure crates

mod feed;
mod repositories;

pub use feed::{ChangeNotifier, DocumentFeed, DocumentStream, PresenceTracker};
pub use repositories::{AppealRepository, DesignRepository, RepoResult, VisitorRepository};
