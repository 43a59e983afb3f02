//! HTTP API Library
//!
//! REST surface over the user service: routing, request validation, error
//! mapping and OpenAPI documentation.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Connect to the database, wire the service and serve HTTP until Ctrl-C.
pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let handle = user_service_lib::bootstrap(config.user_service.clone()).await?;

    let state = AppState::new(
        handle.service,
        Arc::new(handle.database),
        config.server.clone(),
    );

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server.addr().parse()?;
    info!("{} listening on {}", config.server.service_name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
