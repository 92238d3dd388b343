//! Ban page
//!
//! `BanPageOrchestrator` turns URL parameters plus the live visitor and
//! design documents into a sequence of `BanPageUpdate`s; `render` turns a
//! `BanPageView` into HTML.

mod params;
mod render;
mod session;
mod view;

pub use params::{BanPageParams, BanPageQuery};
pub use render::{render_ban_page, render_ban_panel};
pub use session::{BanPageOrchestrator, BanPageSession, BanPageUpdate};
pub use view::BanPageView;
