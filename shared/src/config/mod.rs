//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `access_token` - Token lifetime, encryption key material and issuance locks
//! - `cache` - Redis connection configuration
//! - `environment` - Environment detection and logging configuration

pub mod access_token;
pub mod cache;
pub mod environment;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Re-export commonly used types
pub use access_token::AccessTokenConfig;
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Redis configuration
    pub cache: CacheConfig,

    /// Access token configuration
    pub access_tokens: AccessTokenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            cache: CacheConfig::default(),
            access_tokens: AccessTokenConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// The per-environment file (`.env.production` and so on) and then
    /// `.env` are read from the working directory when present. Real
    /// environment variables win over both, and the per-environment file
    /// wins over `.env`.
    pub fn from_env() -> Self {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        load_env_files(&dir, Environment::from_env());

        let environment = Environment::from_env();
        Self {
            environment,
            cache: CacheConfig::from_env(),
            access_tokens: AccessTokenConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }
}

/// Load `<dir>/.env.<environment>` then `<dir>/.env`
///
/// dotenvy never overwrites a variable that is already set, so earlier
/// sources take precedence.
pub(crate) fn load_env_files(dir: &Path, environment: Environment) {
    for file in [environment.env_file(), ".env"] {
        if dotenvy::from_path(dir.join(file)).is_ok() {
            tracing::debug!(file, "Loaded environment file");
        }
    }
}

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is missing or malformed.
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, "Ignoring malformed environment value");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.access_tokens.time_to_expiry, 7200);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("GK_TEST_ENV_OR_GARBAGE", "not-a-number");
        assert_eq!(env_or("GK_TEST_ENV_OR_GARBAGE", 42u64), 42);
        std::env::remove_var("GK_TEST_ENV_OR_GARBAGE");
        assert_eq!(env_or("GK_TEST_ENV_OR_MISSING", 7u32), 7);
    }

    #[test]
    fn test_environment_file_wins_over_dotenv() {
        let dir = std::env::temp_dir().join(format!("gk-env-files-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(".env.staging"), "GK_TEST_ENV_FILE_SOURCE=staging\n").unwrap();
        std::fs::write(
            dir.join(".env"),
            "GK_TEST_ENV_FILE_SOURCE=dotenv\nGK_TEST_ENV_FILE_FALLBACK=dotenv\n",
        )
        .unwrap();

        load_env_files(&dir, Environment::Staging);

        assert_eq!(std::env::var("GK_TEST_ENV_FILE_SOURCE").unwrap(), "staging");
        assert_eq!(std::env::var("GK_TEST_ENV_FILE_FALLBACK").unwrap(), "dotenv");

        std::env::remove_var("GK_TEST_ENV_FILE_SOURCE");
        std::env::remove_var("GK_TEST_ENV_FILE_FALLBACK");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
