//! Application state for dependency injection.

use std::sync::Arc;

use async_trait::async_trait;

use common::ServiceConfig;
use user_service_lib::infra::Database;
use user_service_lib::service::UserService;

/// Connectivity check used by the health endpoint.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Name reported in the health response
    fn name(&self) -> &'static str;

    /// `Err` carries a short reason
    async fn check(&self) -> Result<(), String>;
}

#[async_trait]
impl HealthProbe for Database {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        self.ping().await.map_err(|e| e.to_string())
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub health: Arc<dyn HealthProbe>,
    pub config: ServiceConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        user_service: Arc<dyn UserService>,
        health: Arc<dyn HealthProbe>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            user_service,
            health,
            config,
        }
    }
}
