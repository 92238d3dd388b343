//! Value objects - immutable identifiers and enumerations

mod ban_category;
mod visitor_id;

pub use ban_category::{BanCategory, BanCategoryParseError};
pub use visitor_id::VisitorId;
