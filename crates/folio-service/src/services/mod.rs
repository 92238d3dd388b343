//! Business logic services
//!
//! Request-scoped services borrow the `ServiceContext`; the design resolver
//! and status listener own clones of it so they can outlive a request.

pub mod appeal;
pub mod auth;
pub mod backends;
pub mod context;
pub mod design;
pub mod error;
pub mod listener;
pub mod moderation;
pub mod policy;
pub mod visitor;

pub use appeal::AppealService;
pub use auth::AdminAuthService;
pub use backends::Backends;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use design::{DesignCache, DesignResolver, DesignSubscription};
pub use error::{ServiceError, ServiceResult};
pub use listener::{ListenerHandle, StatusHandler, StatusListener, StatusSignal, StatusTracker};
pub use moderation::ModerationService;
pub use policy::PolicyReferenceService;
pub use visitor::VisitorService;
