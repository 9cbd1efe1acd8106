//! Redis-backed implementation of the core `TokenStore` contract

use async_trait::async_trait;

use gk_core::errors::DomainError;
use gk_core::repositories::TokenStore;
use gk_shared::CacheConfig;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Token store persisting records, index entries and issuance locks in Redis
///
/// Every key is namespaced with the configured `key_prefix`, so several
/// deployments can share one Redis database and `flush_all` only removes
/// this store's keys.
#[derive(Clone)]
pub struct RedisTokenStore {
    client: RedisClient,
}

impl RedisTokenStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Connect to Redis and wrap the client
    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Ok(Self::new(RedisClient::new(config).await?))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Check that Redis answers PING
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        self.client.health_check().await
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.client.get(&self.key(key)).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        // EX 0 is rejected by Redis
        let ttl = ttl_seconds.max(1);
        Ok(self.client.set_with_expiry(&self.key(key), value, ttl).await?)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError> {
        let ttl = ttl_seconds.max(1);
        Ok(self
            .client
            .set_if_absent_with_expiry(&self.key(key), value, ttl)
            .await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.client.delete(&self.key(key)).await?)
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, DomainError> {
        Ok(self.client.delete_if_equals(&self.key(key), expected).await?)
    }

    async fn flush_all(&self) -> Result<(), DomainError> {
        let prefix = self.client.config().key_prefix.as_deref().map(|p| format!("{}:", p));
        self.client.flush(prefix.as_deref()).await?;
        Ok(())
    }
}
