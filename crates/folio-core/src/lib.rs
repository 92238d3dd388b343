//! # folio-core
//!
//! Domain layer for the portfolio ban subsystem: visitor and ban page
//! documents, the category classifier, default designs, repository and
//! live-feed traits, and domain errors.
//! This crate has no dependency on infrastructure (database, web framework, etc.).

pub mod defaults;
pub mod entities;
pub mod error;
pub mod events;
pub mod policy;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use defaults::default_design;
pub use entities::{
    Appeal, BanPageDesign, CardStyle, DesignAnimation, DesignChange, DesignContent, DesignIcons,
    DesignLayout, DesignTheme, DeviceInfo, EntranceStyle, LocationInfo, VisitorRecord,
    VisitorStatus,
};
pub use error::DomainError;
pub use events::{DocumentChange, DocumentEvent};
pub use policy::{generate_policy_reference, is_valid_policy_reference, CategoryClassifier};
pub use traits::{
    AppealRepository, ChangeNotifier, DesignRepository, DocumentFeed, DocumentStream,
    PresenceTracker, RepoResult, VisitorRepository,
};
pub use value_objects::{BanCategory, BanCategoryParseError, VisitorId};
