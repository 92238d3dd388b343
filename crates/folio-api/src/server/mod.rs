//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::sync::Arc;

use axum::Router;
use folio_common::{AppConfig, AppError};
use folio_service::Backends;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let router = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    // Probes stay outside the rate limit
    router.merge(health_routes()).with_state(state)
}

/// Connect the backends and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<(AppState, Arc<Backends>), AppError> {
    let (service_context, backends) = Backends::connect(&config).await?;
    let backends = Arc::new(backends);
    let state = AppState::new(service_context, config).with_backends(backends.clone());
    Ok((state, backends))
}

/// Serve `app` until ctrl-c
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let (state, backends) = create_app_state(config).await?;

    let result = run_server(create_app(state), &addr).await;
    backends.shutdown().await;
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
