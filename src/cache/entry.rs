//! Cache Entry Module
//!
//! Defines a stored value together with its expiry deadline, as kept by the
//! in-process store.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// An encoded response held by [`MemoryStore`](crate::cache::MemoryStore).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded response blob
    pub value: String,
    /// Deadline after which the entry reads as absent, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl_seconds` from now.
    ///
    /// A deadline too far out for the clock to represent means no expiry.
    pub fn new(value: String, ttl_seconds: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            value,
            expires_at: ttl_seconds.and_then(|ttl| now.checked_add(Duration::from_secs(ttl))),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is dead at `now`.
    ///
    /// The deadline itself counts as expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Checks whether the entry is dead right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
