//! User service configuration.

use common::{env_flag_or, env_parse_or, DatabaseConfig};
use domain::{HashParams, PasswordPolicy};

/// User service configuration.
#[derive(Debug, Clone, Default)]
pub struct UserServiceConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Strength rules for new passwords
    pub password_policy: PasswordPolicy,
    /// Argon2id cost for new credentials
    pub hash_params: HashParams,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            password_policy: policy_from_env(),
            hash_params: hash_params_from_env(),
        }
    }
}

fn policy_from_env() -> PasswordPolicy {
    let defaults = PasswordPolicy::default();
    PasswordPolicy {
        min_length: env_parse_or("PASSWORD_MIN_LENGTH", defaults.min_length),
        require_uppercase: env_flag_or("PASSWORD_REQUIRE_UPPERCASE", defaults.require_uppercase),
        require_lowercase: env_flag_or("PASSWORD_REQUIRE_LOWERCASE", defaults.require_lowercase),
        require_digit: env_flag_or("PASSWORD_REQUIRE_DIGIT", defaults.require_digit),
        require_symbol: env_flag_or("PASSWORD_REQUIRE_SYMBOL", defaults.require_symbol),
    }
}

fn hash_params_from_env() -> HashParams {
    let defaults = HashParams::default();
    HashParams {
        memory_kib: env_parse_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib),
        iterations: env_parse_or("PASSWORD_HASH_ITERATIONS", defaults.iterations),
        parallelism: env_parse_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism),
    }
}
