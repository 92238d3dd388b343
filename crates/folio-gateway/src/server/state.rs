//! Gateway state
//!
//! Everything a live ban page socket needs: the service context for its
//! orchestrator, the connection index, and the heartbeat timing.

use std::sync::Arc;

use folio_common::AppConfig;
use folio_service::ServiceContext;

use crate::connection::ConnectionManager;
use crate::protocol::HelloPayload;

/// Shared dependencies for every socket
#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    connection_manager: Arc<ConnectionManager>,
    config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        connection_manager: Arc<ConnectionManager>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            connection_manager,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    pub fn shared_connection_manager(&self) -> Arc<ConnectionManager> {
        Arc::clone(&self.connection_manager)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Hello payload announcing the configured heartbeat period
    pub fn hello(&self) -> HelloPayload {
        let interval = self.config.ban_page.heartbeat_interval();
        HelloPayload::with_interval(u64::try_from(interval.as_millis()).unwrap_or(u64::MAX))
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("config", &"AppConfig")
            .finish()
    }
}
