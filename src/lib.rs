//! Mirror Proxy - A caching reverse proxy for a single upstream site
//!
//! Forwards requests to fixed upstream paths and keeps whole responses in a
//! Redis-backed cache with TTL expiry and set-if-absent writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::{CachedResponse, ResponseCache, SetMode};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
