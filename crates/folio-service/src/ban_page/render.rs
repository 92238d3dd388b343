//! HTML rendering of a ban page view

use askama::Template;

use super::view::BanPageView;
use crate::services::{ServiceError, ServiceResult};

#[derive(Template)]
#[template(path = "ban_panel.html")]
struct BanPanelTemplate<'a> {
    view: &'a BanPageView,
}

#[derive(Template)]
#[template(path = "ban_page.html")]
struct BanPageTemplate<'a> {
    title: &'a str,
    background: &'a str,
    text_color: &'a str,
    panel: &'a str,
    live_url: Option<&'a str>,
    heartbeat_ms: u64,
}

/// The card alone; the live page swaps it in place on every update
pub fn render_ban_panel(view: &BanPageView) -> ServiceResult<String> {
    BanPanelTemplate { view }
        .render()
        .map_err(|e| ServiceError::internal(format!("ban panel render failed: {e}")))
}

/// Full document. `live_url` is the gateway socket the page listens on; a
/// value starting with `:port` is resolved against the page's host.
/// `heartbeat_ms` is used until the gateway's HELLO names its own period.
pub fn render_ban_page(
    view: &BanPageView,
    live_url: Option<&str>,
    heartbeat_ms: u64,
) -> ServiceResult<String> {
    let panel = render_ban_panel(view)?;
    BanPageTemplate {
        title: &view.design.content.title,
        background: &view.design.theme.background_color,
        text_color: &view.design.theme.text_color,
        panel: &panel,
        live_url,
        heartbeat_ms,
    }
    .render()
    .map_err(|e| ServiceError::internal(format!("ban page render failed: {e}")))
}
