//! Redis cache client implementation
//!
//! This module provides a Redis client with retry logic and the handful of
//! operations the token store needs: set with expiry, conditional set and
//! delete, get, TTL inspection and namespace flushing.

use redis::{
    aio::MultiplexedConnection,
    AsyncCommands, Client, IntoConnectionInfo, RedisError, RedisResult, Script,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use gk_shared::CacheConfig;

use crate::InfrastructureError;

/// Upper bound for the exponential retry delay
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Deletes KEYS[1] only while it holds ARGV[1]
const DELETE_IF_EQUALS_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Whether a failed operation may be sent again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryPolicy {
    /// Retry transient failures up to the configured attempt count
    Transient,
    /// One attempt only. A replayed `SET NX` whose first reply was lost
    /// would report the key as taken by someone else.
    Never,
}

impl RetryPolicy {
    pub(crate) fn max_attempts(self, max_retries: u32) -> u32 {
        match self {
            RetryPolicy::Transient => max_retries.max(1),
            RetryPolicy::Never => 1,
        }
    }
}

/// Redis cache client with retry logic
///
/// Cloning is cheap: clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// Selects `config.database` when it is non-zero; otherwise the database
    /// in the URL (default 0) is used.
    ///
    /// # Example
    /// ```no_run
    /// use gk_infra::cache::RedisClient;
    /// use gk_shared::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_prefix("gatekeep");
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            url = %mask_url(&config.url),
            database = config.database,
            "Creating Redis client"
        );

        let mut connection_info = config.url.as_str().into_connection_info().map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;
        if config.database != 0 {
            connection_info.redis.db = i64::from(config.database);
        }

        let client = Client::open(connection_info).map_err(|e| {
            error!("Failed to open Redis client: {}", e);
            InfrastructureError::Config(format!("Invalid Redis connection settings: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let max_attempts = config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(timed_out("connect")),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value with expiration time (`SET key value EX ttl`)
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!(key = %mask_key(key), expiry_seconds, "Setting key");

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();

            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(|e| {
            error!(key = %mask_key(key), "Failed to set key: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Set a value only if the key does not exist (`SET key value NX EX ttl`)
    ///
    /// # Returns
    /// * `Ok(true)` - The key was written
    /// * `Ok(false)` - The key already existed
    pub async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<bool, InfrastructureError> {
        debug!(key = %mask_key(key), expiry_seconds, "Setting key if absent");

        let result = self
            .execute(RetryPolicy::Never, |mut conn| {
                let key = key.to_string();
                let value = value.to_string();

                Box::pin(async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("NX")
                        .arg("EX")
                        .arg(expiry_seconds)
                        .query_async::<_, Option<String>>(&mut conn)
                        .await
                })
            })
            .await;

        match result {
            Ok(reply) => {
                let written = reply.is_some();
                debug!(key = %mask_key(key), written, "Conditional set finished");
                Ok(written)
            }
            Err(e) => {
                error!(key = %mask_key(key), "Failed to conditionally set key: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get a value from cache
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present
    /// * `Ok(None)` - Key not found or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!(key = %mask_key(key), "Getting key");

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.get::<_, Option<String>>(key).await })
            })
            .await;

        match result {
            Ok(value) => {
                debug!(key = %mask_key(key), found = value.is_some(), "Get finished");
                Ok(value)
            }
            Err(e) => {
                error!(key = %mask_key(key), "Failed to get key: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete a key from cache
    ///
    /// # Returns
    /// * `Ok(true)` - Key was deleted
    /// * `Ok(false)` - Key was not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!(key = %mask_key(key), "Deleting key");

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await;

        match result {
            Ok(deleted_count) => Ok(deleted_count > 0),
            Err(e) => {
                error!(key = %mask_key(key), "Failed to delete key: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete a key only while it holds `expected`
    ///
    /// Runs as a Lua script, so the comparison and the delete cannot be
    /// split by another client's write.
    ///
    /// # Returns
    /// * `Ok(true)` - Key held `expected` and was deleted
    /// * `Ok(false)` - Key was missing or held another value
    pub async fn delete_if_equals(
        &self,
        key: &str,
        expected: &str,
    ) -> Result<bool, InfrastructureError> {
        debug!(key = %mask_key(key), "Deleting key if unchanged");

        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let expected = expected.to_string();

                Box::pin(async move {
                    Script::new(DELETE_IF_EQUALS_SCRIPT)
                        .key(key)
                        .arg(expected)
                        .invoke_async::<_, u32>(&mut conn)
                        .await
                })
            })
            .await;

        match result {
            Ok(deleted_count) => Ok(deleted_count > 0),
            Err(e) => {
                error!(key = %mask_key(key), "Failed to conditionally delete key: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Ok(Some(ttl))` - Remaining TTL in seconds
    /// * `Ok(None)` - Key doesn't exist or has no expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let result = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await;

        match result {
            Ok(ttl) if ttl >= 0 => Ok(Some(ttl)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!(key = %mask_key(key), "Failed to get TTL: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Delete every key starting with `prefix`, or the whole database when
    /// `prefix` is `None`
    ///
    /// # Returns
    /// Number of keys removed; `0` when the whole database was flushed.
    pub async fn flush(&self, prefix: Option<&str>) -> Result<u64, InfrastructureError> {
        let result = match prefix {
            Some(prefix) => {
                let pattern = format!("{}*", prefix);
                warn!(pattern = %pattern, "Flushing Redis keys");

                self.execute_with_retry(|mut conn| {
                    let pattern = pattern.clone();

                    Box::pin(async move {
                        let mut keys = Vec::new();
                        {
                            let mut iter = conn.scan_match::<_, String>(pattern).await?;
                            while let Some(key) = iter.next_item().await {
                                keys.push(key);
                            }
                        }

                        if keys.is_empty() {
                            return Ok(0);
                        }
                        conn.del::<_, u64>(keys).await
                    })
                })
                .await
            }
            None => {
                warn!(database = self.config.database, "Flushing Redis database");

                self.execute_with_retry(|mut conn| {
                    Box::pin(async move {
                        redis::cmd("FLUSHDB").query_async::<_, ()>(&mut conn).await?;
                        Ok(0)
                    })
                })
                .await
            }
        };

        result.map_err(|e| {
            error!("Failed to flush Redis: {}", e);
            InfrastructureError::Cache(e)
        })
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation with automatic retry logic
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        self.execute(RetryPolicy::Transient, operation).await
    }

    /// Execute a Redis operation under `policy`
    ///
    /// Every attempt is bounded by the configured response timeout; retriable
    /// failures back off exponentially from `retry_delay_ms`.
    async fn execute<F, T>(&self, policy: RetryPolicy, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let response_timeout = Duration::from_secs(self.config.response_timeout.max(1));
        let max_attempts = policy.max_attempts(self.config.max_retries);
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            let result = match timeout(response_timeout, operation(conn)).await {
                Ok(result) => result,
                Err(_) => Err(timed_out("response")),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

fn timed_out(stage: &str) -> RedisError {
    RedisError::from(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("Redis {} timed out", stage),
    ))
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}

/// Keep the key namespace and a short prefix of its last segment
pub(crate) fn mask_key(key: &str) -> String {
    let (namespace, last) = match key.rfind(':') {
        Some(pos) => key.split_at(pos + 1),
        None => ("", key),
    };
    let visible: String = last.chars().take(8).collect();
    format!("{}{}***", namespace, visible)
}
