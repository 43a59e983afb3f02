//! Gateway configuration.

use common::ServiceConfig;
use user_service_lib::config::UserServiceConfig;

/// Everything the HTTP binary needs to start.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Bind address and service name
    pub server: ServiceConfig,
    /// Database, password policy and hashing cost
    pub user_service: UserServiceConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            server: ServiceConfig::from_env(),
            user_service: UserServiceConfig::from_env(),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }
}
