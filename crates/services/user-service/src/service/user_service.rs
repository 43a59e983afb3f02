//! User service - Handles user-related business logic.
//!
//! Owns credential handling for the user lifecycle: passwords are checked
//! against the policy and hashed here, and only credentials reach the
//! repository. Plaintext passwords are never logged.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    normalize_email, CreateUser, CredentialHasher, NewUser, Password, PasswordPolicy, UpdateUser,
    User, MAX_NAME_LENGTH, MIN_NAME_LENGTH, TIMING_DUMMY_PASSWORD,
};

use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new user
    async fn create_user(&self, input: CreateUser) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Update name and/or email
    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<User>;

    /// Delete a user; unknown IDs are an error
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Delete several users atomically; returns how many were deleted
    async fn delete_users(&self, ids: Vec<Uuid>) -> AppResult<u64>;

    /// Check an email/password pair
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;

    /// Find users whose name contains the fragment
    async fn search_users(&self, name: &str) -> AppResult<Vec<User>>;

    /// Replace the password after confirming the current one
    async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    policy: PasswordPolicy,
    /// Verified against when a login names an unknown email
    dummy_credential: OnceCell<Password>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: CredentialHasher,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            repo,
            hasher,
            policy,
            dummy_credential: OnceCell::new(),
        }
    }

    /// Argon2 is CPU-bound, so hashing runs on the blocking pool.
    async fn hash(&self, plain_text: &str) -> AppResult<Password> {
        let hasher = self.hasher.clone();
        let plain_text = plain_text.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&plain_text))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }

    async fn dummy_credential(&self) -> AppResult<Password> {
        if let Some(credential) = self.dummy_credential.get() {
            return Ok(credential.clone());
        }

        let credential = self.hash(TIMING_DUMMY_PASSWORD).await?;
        Ok(self.dummy_credential.get_or_init(|| credential).clone())
    }

    /// Fail if the email belongs to someone other than `owner`.
    async fn ensure_email_available(&self, email: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.repo.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::DuplicateEmail),
            _ => Ok(()),
        }
    }
}

fn require_non_blank(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// Trimmed display name, length counted in characters.
fn clean_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    let length = name.chars().count();

    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(AppError::validation(format!(
            "Name must be between {} and {} characters",
            MIN_NAME_LENGTH, MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// Verify on the blocking pool; see [`UserManager::hash`].
async fn verify(credential: Password, plain_text: &str) -> AppResult<bool> {
    let plain_text = plain_text.to_string();

    tokio::task::spawn_blocking(move || credential.verify(&plain_text))
        .await
        .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        let name = clean_name(&input.name)?;
        let email = normalize_email(&input.email);
        require_non_blank(&email, "Email")?;
        self.policy.check(&input.password)?;

        if self.repo.find_by_email(&email).await?.is_some() {
            tracing::info!(email = %email, "Rejected registration for taken email");
            return Err(AppError::DuplicateEmail);
        }

        let credential = self.hash(&input.password).await?;
        let user = self
            .repo
            .create(NewUser {
                name,
                email,
                password_hash: credential.into_string(),
            })
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<User> {
        let name = input.name.as_deref().map(clean_name).transpose()?;

        // Unknown ids are reported before any email conflict.
        self.get_user(id).await?;

        let email = match input.email {
            Some(email) => {
                let email = normalize_email(&email);
                require_non_blank(&email, "Email")?;
                self.ensure_email_available(&email, Some(id)).await?;
                Some(email)
            }
            None => None,
        };

        let user = self.repo.update(id, name, email).await?;
        tracing::info!(user_id = %id, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn delete_users(&self, ids: Vec<Uuid>) -> AppResult<u64> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = ids.into_iter().filter(|id| seen.insert(*id)).collect();

        if ids.is_empty() {
            return Err(AppError::validation("At least one user ID is required"));
        }

        let deleted = self.repo.delete_many(ids).await?;
        tracing::info!(count = deleted, "Users deleted in bulk");
        Ok(deleted)
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        let user = self.repo.find_by_email(&email).await?;

        // Verify even when the user is unknown so response timing does not
        // reveal which emails are registered.
        let valid = match &user {
            Some(user) => verify(user.credential(), password).await?,
            None => {
                verify(self.dummy_credential().await?, password).await?;
                false
            }
        };

        match user {
            Some(user) if valid => {
                tracing::info!(user_id = %user.id, "Login succeeded");
                Ok(user)
            }
            _ => {
                tracing::warn!(email = %email, "Login failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn search_users(&self, name: &str) -> AppResult<Vec<User>> {
        require_non_blank(name, "Search name")?;
        self.repo.search_by_name(name.trim()).await
    }

    async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User> {
        let user = self.get_user(id).await?;

        if !verify(user.credential(), current_password).await? {
            tracing::warn!(user_id = %id, "Password change rejected: current password mismatch");
            return Err(AppError::InvalidCredentials);
        }
        if current_password == new_password {
            return Err(AppError::validation(
                "New password must differ from the current password",
            ));
        }
        self.policy.check(new_password)?;

        let credential = self.hash(new_password).await?;
        let user = self.repo.update_password(id, credential.into_string()).await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(user)
    }
}
