//! Axum extractors for request handling
//!
//! Admin bearer authentication, typed path parameters, and validated JSON.

mod admin;
mod path;
mod validated;

pub use admin::AdminUser;
pub use path::{CategoryPath, VisitorPath};
pub use validated::ValidatedJson;
