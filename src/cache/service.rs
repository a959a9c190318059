//! Response Cache Module
//!
//! Key/value access to cached responses on top of a [`KvStore`], with every
//! store call bounded by a timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::cache::{codec, CachedResponse, KvStore, SetMode, MAX_KEY_LENGTH, MAX_TTL_SECONDS};
use crate::error::{CacheError, Result};

// == Response Cache ==
/// Stateless façade over a shared store handle.
///
/// Cloning is cheap and every clone talks to the same store, so handlers may
/// call it concurrently without further locking.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KvStore>,
    op_timeout: Duration,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a cache over `store`.
    ///
    /// # Arguments
    /// * `store` - Store handle, owned by whoever bootstrapped the process
    /// * `op_timeout` - Upper bound for each store call
    pub fn new(store: Arc<dyn KvStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    /// Name of the backing store.
    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    // == Get ==
    /// Looks up `key`.
    ///
    /// Returns `Ok(None)` on a miss. A stored value that fails to decode is
    /// reported as [`CacheError::Decode`], never as a miss.
    pub async fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        validate_key(key)?;

        let blob = self.bounded("get", self.store.get(key)).await?;
        match blob {
            Some(blob) => {
                trace!(key, bytes = blob.len(), "cache entry found");
                Ok(Some(codec::decode(&blob)?))
            }
            None => Ok(None),
        }
    }

    // == Set ==
    /// Encodes `response` and stores it under `key`.
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `response` - Response to persist
    /// * `ttl` - Lifetime in seconds (1..=[`MAX_TTL_SECONDS`]), None for no expiry
    /// * `mode` - [`SetMode::IfAbsent`] to fill once, [`SetMode::Overwrite`] to replace
    ///
    /// Returns true only if the write took effect. Losing an `IfAbsent` race
    /// is `Ok(false)`.
    pub async fn set(
        &self,
        key: &str,
        response: &CachedResponse,
        ttl: Option<u64>,
        mode: SetMode,
    ) -> Result<bool> {
        validate_key(key)?;
        if let Some(ttl) = ttl {
            if ttl == 0 || ttl > MAX_TTL_SECONDS {
                return Err(CacheError::InvalidTtl(ttl));
            }
        }

        let blob = codec::encode(response);
        self.bounded("set", self.store.set(key, blob, ttl, mode)).await
    }

    // == Delete ==
    /// Removes `key`, returning whether anything was removed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        self.bounded("delete", self.store.delete(key)).await
    }

    // == Ping ==
    /// Checks that the store answers within the timeout.
    pub async fn ping(&self) -> Result<()> {
        self.bounded("ping", self.store.ping()).await
    }

    /// Runs a store call under the operation timeout. No retries.
    async fn bounded<T>(&self, op: &'static str, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.op_timeout, call)
            .await
            .map_err(|_| {
                CacheError::StoreUnavailable(format!(
                    "{} on {} store timed out after {:?}",
                    op,
                    self.store.name(),
                    self.op_timeout
                ))
            })?
    }
}

// == Key Validation ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if !key.is_ascii() {
        return Err(CacheError::InvalidKey(format!("{:?} is not ASCII", key)));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
