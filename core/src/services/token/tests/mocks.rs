//! Test doubles for the token service

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::DomainError;
use crate::repositories::{MemoryTokenStore, TokenStore};
use crate::services::token::Clock;

// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now = *now + Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// Memory store that counts calls and can be told to fail
#[derive(Default)]
pub struct MockStore {
    pub inner: MemoryTokenStore,
    pub fail_reads: AtomicBool,
    pub fail_record_writes: AtomicBool,
    pub fail_index_writes: AtomicBool,
    // Hands every freshly taken lock to "next-holder", as if it had expired
    pub takeover_locks: AtomicBool,
    pub calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn unavailable() -> DomainError {
        DomainError::Storage {
            message: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl TokenStore for MockStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if key.starts_with("token:record:") && self.fail_record_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        if key.starts_with("token:identity:") && self.fail_index_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.set(key, value, ttl_seconds).await
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let written = self.inner.set_if_absent(key, value, ttl_seconds).await?;
        if written && self.takeover_locks.load(Ordering::SeqCst) {
            self.inner.set(key, "next-holder", ttl_seconds).await?;
        }
        Ok(written)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.delete_if_equals(key, expected).await
    }

    async fn flush_all(&self) -> Result<(), DomainError> {
        self.inner.flush_all().await
    }
}
