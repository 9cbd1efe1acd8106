//! Token store trait defining the key-value contract the token service needs.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Async key-value backend with per-key TTL
///
/// Implementations must provide per-key linearizable writes: a write that
/// has returned is visible to every later read of the same key. Transport
/// failures are reported as [`DomainError::Storage`].
///
/// # Example
/// ```no_run
/// # use gk_core::repositories::TokenStore;
/// # async fn example(store: &impl TokenStore) -> Result<(), Box<dyn std::error::Error>> {
/// store.set("token:record:abc", "blob", 3600).await?;
///
/// match store.get("token:record:abc").await? {
///     Some(blob) => println!("found {} bytes", blob.len()),
///     None => println!("missing or expired"),
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Fetch the value stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present and not expired
    /// * `Ok(None)` - Key absent or already evicted
    /// * `Err(DomainError)` - Backend unreachable
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Store `value` under `key`, replacing any previous value, expiring
    /// after `ttl_seconds` (at least one second)
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError>;

    /// Store `value` only if `key` is absent
    ///
    /// # Returns
    /// * `Ok(true)` - The value was written
    /// * `Ok(false)` - The key already existed; nothing changed
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError>;

    /// Remove `key`
    ///
    /// # Returns
    /// * `Ok(true)` - Key existed and was removed
    /// * `Ok(false)` - Key was not present
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Remove `key` only while it still holds `expected`, as one atomic step
    ///
    /// # Returns
    /// * `Ok(true)` - Key held `expected` and was removed
    /// * `Ok(false)` - Key was absent or held another value; nothing changed
    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, DomainError>;

    /// Remove every key. Administrative and test use only.
    async fn flush_all(&self) -> Result<(), DomainError>;
}

#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError> {
        (**self).set_if_absent(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        (**self).delete(key).await
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, DomainError> {
        (**self).delete_if_equals(key, expected).await
    }

    async fn flush_all(&self) -> Result<(), DomainError> {
        (**self).flush_all().await
    }
}
