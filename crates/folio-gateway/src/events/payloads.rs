//! Dispatch payloads

use folio_core::BanCategory;
use folio_service::{render_ban_panel, BanPageUpdate, BanPageView, ServiceError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::BanPageEventType;

/// BAN_PAGE_RENDER and BAN_PAGE_CONNECTION_LOST
///
/// `html` is the rendered panel; `view` lets the page restyle the body.
#[derive(Debug, Clone, Serialize)]
pub struct RenderPayload<'a> {
    pub view: &'a BanPageView,
    pub html: String,
}

/// BAN_PAGE_TRANSITIONING
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TransitioningPayload {
    pub from: BanCategory,
    pub to: BanCategory,
}

/// BAN_PAGE_UNBANNED
#[derive(Debug, Clone, Serialize)]
pub struct UnbannedPayload<'a> {
    pub redirect_to: &'a str,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("render failed: {0}")]
    Render(#[from] ServiceError),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Event type and payload for a session update
pub fn encode_update(update: &BanPageUpdate) -> Result<(BanPageEventType, Value), EncodeError> {
    let encoded = match update {
        BanPageUpdate::Render(view) => (
            BanPageEventType::BanPageRender,
            serde_json::to_value(RenderPayload {
                view,
                html: render_ban_panel(view)?,
            })?,
        ),
        BanPageUpdate::ConnectionLost(view) => (
            BanPageEventType::BanPageConnectionLost,
            serde_json::to_value(RenderPayload {
                view,
                html: render_ban_panel(view)?,
            })?,
        ),
        BanPageUpdate::Transitioning { from, to } => (
            BanPageEventType::BanPageTransitioning,
            serde_json::to_value(TransitioningPayload { from: *from, to: *to })?,
        ),
        BanPageUpdate::Unbanned { redirect_to } => (
            BanPageEventType::BanPageUnbanned,
            serde_json::to_value(UnbannedPayload { redirect_to })?,
        ),
    };
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_service::{BanPageOrchestrator, BanPageParams};

    async fn sample_view() -> BanPageView {
        let store = std::sync::Arc::new(folio_db::MemoryStore::new());
        let ctx = folio_service::ServiceContext::builder()
            .repositories(store.clone())
            .feed(store.clone())
            .notifier(store.clone())
            .presence(store)
            .build()
            .unwrap();
        let params = BanPageParams {
            ban_reason: Some("harassment".to_string()),
            initial_category: BanCategory::Danger,
            ..BanPageParams::new(None)
        };
        BanPageOrchestrator::new(&ctx).initial_view(&params).await
    }

    #[tokio::test]
    async fn test_render_carries_panel_html_and_view() {
        let view = sample_view().await;
        let (event, payload) = encode_update(&BanPageUpdate::Render(view)).unwrap();

        assert_eq!(event, BanPageEventType::BanPageRender);
        assert!(payload["html"].as_str().unwrap().contains("id=\"ban-panel\""));
        assert_eq!(payload["view"]["category"], "danger");
        assert_eq!(payload["view"]["connectionLost"], false);
    }

    #[tokio::test]
    async fn test_connection_lost_shows_notice() {
        let mut view = sample_view().await;
        view.connection_lost = true;
        let (event, payload) = encode_update(&BanPageUpdate::ConnectionLost(view)).unwrap();

        assert_eq!(event, BanPageEventType::BanPageConnectionLost);
        assert!(payload["html"].as_str().unwrap().contains("Connection lost"));
    }

    #[test]
    fn test_transitioning_and_unbanned() {
        let (event, payload) = encode_update(&BanPageUpdate::Transitioning {
            from: BanCategory::Normal,
            to: BanCategory::Severe,
        })
        .unwrap();
        assert_eq!(event, BanPageEventType::BanPageTransitioning);
        assert_eq!(payload, serde_json::json!({ "from": "normal", "to": "severe" }));

        let (event, payload) = encode_update(&BanPageUpdate::Unbanned {
            redirect_to: "/abc".to_string(),
        })
        .unwrap();
        assert_eq!(event, BanPageEventType::BanPageUnbanned);
        assert_eq!(payload["redirect_to"], "/abc");
    }
}
