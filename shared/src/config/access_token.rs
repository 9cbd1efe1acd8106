//! Access token configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Access token lifetime and encryption settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessTokenConfig {
    /// Seconds until an issued token expires. `0` issues tokens that are
    /// already expired.
    #[serde(default = "default_time_to_expiry")]
    pub time_to_expiry: u64,

    /// Base64 encoded 256-bit key used to encrypt token secrets at rest
    #[serde(default, skip_serializing)]
    pub encryption_key: Option<String>,

    /// TTL in seconds of the per-identity issuance lock
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
}

impl Default for AccessTokenConfig {
    fn default() -> Self {
        Self {
            time_to_expiry: default_time_to_expiry(),
            encryption_key: None,
            lock_ttl_seconds: default_lock_ttl(),
        }
    }
}

impl AccessTokenConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            time_to_expiry: env_or("ACCESS_TOKEN_TIME_TO_EXPIRY", default_time_to_expiry()),
            encryption_key: std::env::var("ACCESS_TOKEN_ENCRYPTION_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            lock_ttl_seconds: env_or("ACCESS_TOKEN_LOCK_TTL", default_lock_ttl()),
        }
    }

    /// Set the token lifetime in seconds
    pub fn with_time_to_expiry(mut self, seconds: u64) -> Self {
        self.time_to_expiry = seconds;
        self
    }

    /// Set the base64 encoded encryption key
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    /// Check whether encryption key material has been configured
    pub fn has_encryption_key(&self) -> bool {
        self.encryption_key.is_some()
    }
}

fn default_time_to_expiry() -> u64 {
    7200 // 2 hours
}

fn default_lock_ttl() -> u64 {
    5
}
