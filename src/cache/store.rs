//! Store Module
//!
//! The key/value seam between the response cache and whatever store keeps
//! the bytes.

use async_trait::async_trait;

use crate::error::Result;

// == Set Mode ==
/// Collision behavior of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    /// Write only if the key holds no live value (atomic set-if-absent)
    #[default]
    IfAbsent,
    /// Replace any existing value and its TTL
    Overwrite,
}

// == Key/Value Store ==
/// A remote or in-process string store with per-key expiry.
///
/// Implementations must make [`SetMode::IfAbsent`] atomic: of several
/// concurrent conditional writes to the same absent key exactly one may
/// report success.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Backend name for logs and health reports.
    fn name(&self) -> &'static str;

    /// Returns the live value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`.
    ///
    /// `ttl` is in seconds; `None` means no expiry. Returns whether the write
    /// took effect.
    async fn set(&self, key: &str, value: String, ttl: Option<u64>, mode: SetMode) -> Result<bool>;

    /// Removes `key`, returning whether a live value was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Checks that the store answers.
    async fn ping(&self) -> Result<()>;
}
