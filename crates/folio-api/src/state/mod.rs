//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the configuration, and the backend connections probed by readiness.

use std::sync::Arc;

use folio_common::AppConfig;
use folio_core::VisitorId;
use folio_service::{Backends, ServiceContext};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    /// `None` when the context was assembled in-process (tests, demos)
    backends: Option<Arc<Backends>>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            backends: None,
        }
    }

    pub fn with_backends(mut self, backends: Arc<Backends>) -> Self {
        self.backends = Some(backends);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backends(&self) -> Option<&Backends> {
        self.backends.as_deref()
    }

    /// Live ban page socket, relative to the host the page was served from
    pub fn live_url(&self, visitor_id: Option<VisitorId>, query: Option<&str>) -> String {
        let mut url = match visitor_id {
            Some(id) => format!(":{}/ban/{id}/live", self.config.gateway.port),
            None => format!(":{}/ban/live", self.config.gateway.port),
        };
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("backends", &self.backends.is_some())
            .finish()
    }
}
