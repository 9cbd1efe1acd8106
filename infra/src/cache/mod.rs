//! Cache module for Redis-based token storage
//!
//! This module provides the Redis client (retry logic, conditional writes,
//! health checks) and the `TokenStore` implementation built on it.

pub mod redis_client;
pub mod token_store;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use token_store::RedisTokenStore;

// Re-export commonly used types
pub use gk_shared::CacheConfig;
