//! Service banner at `/`.

use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Endpoints listed in the banner
const ENDPOINTS: &[(&str, &str)] = &[
    ("users_list", "GET /users"),
    ("user_detail", "GET /users/{id}"),
    ("user_create", "POST /users"),
    ("user_update", "PUT /users/{id}"),
    ("user_delete", "DELETE /users/{id}"),
    ("user_login", "POST /users/login"),
    ("user_search", "GET /users/search?name={name}"),
    ("user_change_password", "POST /users/{id}/change-password"),
    ("user_bulk_delete", "POST /users/bulk-delete"),
    ("health", "GET /health"),
    ("docs", "GET /swagger-ui"),
];

/// Banner payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub application: String,
    pub version: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub name: String,
    pub route: String,
}

/// Describe the running service and its routes.
pub async fn welcome(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        application: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        timestamp: Utc::now(),
        endpoints: ENDPOINTS
            .iter()
            .map(|(name, route)| EndpointInfo {
                name: name.to_string(),
                route: route.to_string(),
            })
            .collect(),
    })
}
