//! User Service Library
//!
//! User management and credential handling over a SeaORM-backed store.
//! The HTTP layer embeds it through [`bootstrap`].

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use domain::CredentialHasher;
use tracing::info;

use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::repository::UserStore;
use crate::service::{UserManager, UserService};

/// Connected database plus the service wired on top of it.
pub struct UserServiceHandle {
    pub database: Database,
    pub service: Arc<dyn UserService>,
}

/// Connect, migrate, and wire repository and service together.
///
/// Fails before any connection is made if the hashing parameters are invalid.
pub async fn bootstrap(
    config: UserServiceConfig,
) -> Result<UserServiceHandle, Box<dyn std::error::Error>> {
    let hasher = CredentialHasher::new(config.hash_params)?;

    let database = Database::connect(&config.database).await?;
    let user_repo = Arc::new(UserStore::new(database.get_connection()));
    let service: Arc<dyn UserService> =
        Arc::new(UserManager::new(user_repo, hasher, config.password_policy));

    info!("User service ready");
    Ok(UserServiceHandle { database, service })
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
