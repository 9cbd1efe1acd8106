//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Gatekeep token
//! engine. It provides the Redis client and the Redis-backed `TokenStore`,
//! and wires configuration, Redis and the core `TokenService` together.

use std::sync::Arc;

use gk_core::errors::DomainError;
use gk_core::services::token::TokenService;
use gk_shared::AppConfig;

/// Cache module - Redis client and token store
pub mod cache;

pub use cache::{RedisClient, RedisTokenStore};

/// Token service backed by Redis
pub type RedisTokenService = TokenService<RedisTokenStore>;

/// Connect to Redis and build a ready token service
///
/// # Errors
///
/// * `InfrastructureError::Cache` - Redis is unreachable after all retries
/// * `InfrastructureError::Config` - The Redis URL is invalid
/// * `InfrastructureError::Domain` - The configured encryption key is malformed
pub async fn build_token_service(config: &AppConfig) -> Result<RedisTokenService, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing token service");

    if !config.access_tokens.has_encryption_key() {
        tracing::warn!("ACCESS_TOKEN_ENCRYPTION_KEY is not set; token issuance will fail");
    }

    let store = RedisTokenStore::connect(config.cache.clone()).await?;
    let service = TokenService::from_config(Arc::new(store), &config.access_tokens)?;

    tracing::info!(
        time_to_expiry = config.access_tokens.time_to_expiry,
        "Token service initialized successfully"
    );

    Ok(service)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by the core domain
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Domain(inner) => inner,
            InfrastructureError::Cache(e) => DomainError::Storage {
                message: e.to_string(),
            },
            InfrastructureError::Config(message) => DomainError::Internal { message },
        }
    }
}
