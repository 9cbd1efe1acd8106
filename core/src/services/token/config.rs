//! Configuration for the token service

use gk_shared::AccessTokenConfig;

/// Longest lifetime a token can be issued with (100 years)
pub const MAX_TIME_TO_EXPIRY_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// Configuration for the token service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenServiceConfig {
    /// Token lifetime in seconds; `0` issues tokens that are born expired
    pub time_to_expiry_seconds: u64,
    /// TTL in seconds of the per-identity lock used by exclusive issuance
    pub lock_ttl_seconds: u64,
}

impl TokenServiceConfig {
    /// Create a configuration with the given token lifetime
    pub fn new(time_to_expiry_seconds: u64) -> Self {
        Self {
            time_to_expiry_seconds,
            ..Default::default()
        }
    }

    /// TTL handed to the store. Stores reject a zero TTL, so the floor is one
    /// second; the explicit `expires_at` check still treats a zero lifetime
    /// as already expired.
    pub fn store_ttl_seconds(&self) -> u64 {
        self.time_to_expiry_seconds.clamp(1, MAX_TIME_TO_EXPIRY_SECONDS)
    }

    pub fn lock_ttl(&self) -> u64 {
        self.lock_ttl_seconds.max(1)
    }

    /// Token lifetime as a chrono duration, capped at
    /// [`MAX_TIME_TO_EXPIRY_SECONDS`]
    pub fn time_to_expiry(&self) -> chrono::Duration {
        let seconds = self.time_to_expiry_seconds.min(MAX_TIME_TO_EXPIRY_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&AccessTokenConfig::default())
    }
}

impl From<&AccessTokenConfig> for TokenServiceConfig {
    fn from(config: &AccessTokenConfig) -> Self {
        Self {
            time_to_expiry_seconds: config.time_to_expiry,
            lock_ttl_seconds: config.lock_ttl_seconds,
        }
    }
}
