//! Database models - SQLx row types
//!
//! Rows carry the document as raw JSON; conversion into domain entities
//! validates it (see `folio_core::VisitorRecord::from_document`).

mod appeal;
mod design;
mod visitor;

pub use appeal::AppealModel;
pub use design::DesignModel;
pub use visitor::VisitorModel;
