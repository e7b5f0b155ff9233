//! In-process counter store.
//!
//! Used when no store address is configured, and as a controllable fake in
//! tests: it can be told to fail every command on demand.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CounterStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: DashMap<String, i64>,
    failing: AtomicBool,
    pings: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent command fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    /// Current value of `key`, zero if never incremented.
    pub fn get(&self, key: &str) -> i64 {
        self.counters.get(key).map(|v| *v).unwrap_or(0)
    }

    /// Number of probes answered, successful or not.
    pub fn ping_count(&self) -> u64 {
        self.pings.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.is_failing() {
            Err(StoreError::Unavailable("memory store set to fail".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        self.check()?;
        let mut value = self.counters.entry(key.to_owned()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn increments_per_key() {
        let store = MemoryStore::new();
        assert_eq!(store.increment("visits").await.unwrap(), 1);
        assert_eq!(store.increment("visits").await.unwrap(), 2);
        assert_eq!(store.increment("other").await.unwrap(), 1);
        assert_eq!(store.get("visits"), 2);
        assert_eq!(store.get("missing"), 0);
    }

    #[tokio::test]
    async fn failing_store_drops_increments() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.increment("visits").await.is_err());
        assert!(store.ping().await.is_err());
        assert_eq!(store.get("visits"), 0);

        store.set_failing(false);
        assert!(store.ping().await.is_ok());
        assert_eq!(store.ping_count(), 2);
    }
}
