//! Health check handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub services: Vec<ServiceHealth>,
}

/// Dependency health with optional error message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Health check endpoint - verifies database connectivity.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let probe = &state.health;
    let service = match probe.check().await {
        Ok(()) => ServiceHealth {
            name: probe.name().to_string(),
            status: "healthy".to_string(),
            error: None,
        },
        Err(e) => {
            tracing::warn!(service = probe.name(), error = %e, "Health check failed");
            ServiceHealth {
                name: probe.name().to_string(),
                status: "unhealthy".to_string(),
                error: Some(e),
            }
        }
    };

    let healthy = service.error.is_none();
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        services: vec![service],
    };

    if healthy {
        (StatusCode::OK, Json(response)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    }
}
