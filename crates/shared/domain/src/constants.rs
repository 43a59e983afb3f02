//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Default minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Display name length bounds, in characters after trimming
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;

// =============================================================================
// Credential hashing (Argon2id)
// =============================================================================

/// Default memory cost in KiB
pub const DEFAULT_HASH_MEMORY_KIB: u32 = argon2::Params::DEFAULT_M_COST;

/// Default number of passes
pub const DEFAULT_HASH_ITERATIONS: u32 = argon2::Params::DEFAULT_T_COST;

/// Default degree of parallelism
pub const DEFAULT_HASH_PARALLELISM: u32 = argon2::Params::DEFAULT_P_COST;

/// Plaintext hashed once and verified against when a login names an unknown
/// email, so both failure paths do the same work.
pub const TIMING_DUMMY_PASSWORD: &str = "timing-equalizer-not-a-real-password";
