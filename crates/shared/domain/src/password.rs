//! Credential handling - hashing, verification and strength policy.
//!
//! Credentials are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`).
//! The algorithm, version, cost parameters and salt travel inside the string,
//! so a credential hashed under old cost settings still verifies after the
//! configured cost changes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB, DEFAULT_HASH_PARALLELISM,
    MIN_PASSWORD_LENGTH,
};
use crate::error::{DomainError, DomainResult};

/// Stored credential value object.
///
/// Holds the PHC-encoded hash, never the plaintext.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Wrap an existing hash (from database).
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this credential.
    ///
    /// Re-derives with the parameters and salt embedded in the stored hash;
    /// the final digest comparison is constant-time. A malformed stored
    /// credential never matches.
    pub fn verify(&self, plain_text: &str) -> bool {
        let parsed = match PasswordHash::new(&self.hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored credential is not a valid PHC string");
                return false;
            }
        };

        Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

// =============================================================================
// Hasher
// =============================================================================

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
            parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }
}

/// Produces salted Argon2id credentials with a fixed cost configuration.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Build a hasher, rejecting cost parameters Argon2 cannot run with.
    pub fn new(params: HashParams) -> DomainResult<Self> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| DomainError::hashing(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    /// Returns `DomainError::Hashing` if the backend fails. There is no
    /// fallback: the plaintext is never handed back as a credential.
    pub fn hash(&self, plain_text: &str) -> DomainResult<Password> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::hashing(format!("Password hash failed: {}", e)))?;
        Ok(Password {
            hash: hash.to_string(),
        })
    }

    #[inline]
    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

// =============================================================================
// Strength policy
// =============================================================================

/// Password strength requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum length in characters (not bytes)
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    /// Any non-alphanumeric, non-whitespace character counts as a symbol
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
        }
    }
}

impl PasswordPolicy {
    /// Check whether a password satisfies every rule of this policy.
    pub fn is_strong(&self, plain_text: &str) -> bool {
        self.check(plain_text).is_ok()
    }

    /// Check the password, reporting the first rule it breaks.
    pub fn check(&self, plain_text: &str) -> DomainResult<()> {
        if plain_text.chars().count() < self.min_length {
            return Err(DomainError::password(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        let mut upper = false;
        let mut lower = false;
        let mut digit = false;
        let mut symbol = false;
        for c in plain_text.chars() {
            if c.is_uppercase() {
                upper = true;
            } else if c.is_lowercase() {
                lower = true;
            } else if c.is_numeric() {
                digit = true;
            } else if !c.is_alphanumeric() && !c.is_whitespace() {
                symbol = true;
            }
        }

        let missing = [
            (self.require_uppercase && !upper, "an uppercase letter"),
            (self.require_lowercase && !lower, "a lowercase letter"),
            (self.require_digit && !digit, "a digit"),
            (self.require_symbol && !symbol, "a symbol"),
        ]
        .into_iter()
        .find(|(failed, _)| *failed);

        match missing {
            Some((_, class)) => Err(DomainError::password(format!(
                "Password must contain {}",
                class
            ))),
            None => Ok(()),
        }
    }
}
