//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in folio-core.

mod appeal;
mod design;
mod error;
mod visitor;

pub use appeal::PgAppealRepository;
pub use design::PgDesignRepository;
pub use visitor::PgVisitorRepository;
