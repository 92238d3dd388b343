//! Gateway server setup

mod handler;
mod state;

pub use handler::{anonymous_live_handler, live_handler};
pub use state::GatewayState;

use axum::{routing::get, Router};
use folio_common::{AppConfig, AppError};
use folio_service::Backends;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::connection::ConnectionManager;

pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ban/live", get(anonymous_live_handler))
        .route("/ban/:visitor_id/live", get(live_handler))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect the backends and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<(GatewayState, Backends), AppError> {
    let (service_context, backends) = Backends::connect(&config).await?;
    let state = GatewayState::new(service_context, ConnectionManager::new_shared(), config);
    Ok((state, backends))
}

/// Serve `app` until ctrl-c
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/ban/{{visitor_id}}/live", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();
    let (state, backends) = create_gateway_state(config).await?;
    let connections = state.shared_connection_manager();

    let result = run_server(create_app(state), &addr).await;
    tracing::info!(open = connections.connection_count(), "Gateway stopped");
    backends.shutdown().await;
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
