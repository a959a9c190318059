//! Cache Module
//!
//! Persists whole upstream responses in a key/value store with TTL expiry
//! and set-if-absent writes.

pub mod codec;
mod entry;
mod memory;
mod redis_store;
mod response;
mod service;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use response::CachedResponse;
pub use service::ResponseCache;
pub use store::{KvStore, SetMode};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Longest accepted TTL in seconds; Redis refuses larger `EX` values
pub const MAX_TTL_SECONDS: u64 = i64::MAX as u64 / 1000;

/// Cache key of the mirrored help page
pub const HELP_CACHE_KEY: &str = "help";
