//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user entity, its public projection, and credential handling.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::{CredentialHasher, HashParams, Password, PasswordPolicy};
pub use user::{normalize_email, CreateUser, NewUser, UpdateUser, User, UserResponse};
