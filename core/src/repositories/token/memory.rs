//! In-process implementation of [`TokenStore`] for tests and single-node
//! development setups.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use crate::errors::DomainError;

use super::store::TokenStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Memory-backed token store honouring per-key TTLs
///
/// Expiry is measured on the tokio clock, so tests running with a paused
/// clock can move entries past their TTL with `tokio::time::advance`.
/// Reads hide expired entries; every write sweeps them out, so the map
/// never holds more than the live keys plus whatever expired since the
/// last write.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryTokenStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn deadline(ttl_seconds: u64) -> Instant {
        Instant::now() + Duration::from_secs(ttl_seconds)
    }

    fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) {
        entries.retain(|_, entry| entry.is_live(now));
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Self::deadline(ttl_seconds),
        };

        let mut entries = self.entries.write().await;
        Self::sweep(&mut entries, Instant::now());
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        Self::sweep(&mut entries, Instant::now());

        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Self::deadline(ttl_seconds),
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        match entries.get(key) {
            Some(entry) if entry.is_live(now) && entry.value == expected => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn flush_all(&self) -> Result<(), DomainError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
