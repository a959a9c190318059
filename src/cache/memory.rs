//! Memory Store Module
//!
//! In-process [`KvStore`] backed by a HashMap with TTL expiration. Used when
//! no remote store is configured and throughout the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::cache::{CacheEntry, KvStore, SetMode};
use crate::error::Result;

// == Memory Store ==
/// Key/value storage living in the proxy process.
///
/// Expired entries read as absent immediately and are physically removed by
/// [`MemoryStore::cleanup_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    // == Is Empty ==
    /// Returns true if no live entry is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<u64>, mode: SetMode) -> Result<bool> {
        // The check and the insert share one write guard, which is what makes
        // IfAbsent atomic.
        let mut entries = self.entries.write().await;

        if mode == SetMode::IfAbsent {
            if let Some(existing) = entries.get(key) {
                if !existing.is_expired() {
                    return Ok(false);
                }
            }
        }

        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
