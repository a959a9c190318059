//! API Handlers
//!
//! One handler per mirrored upstream path, plus the health endpoint. The
//! help page is the only one served through the response cache.

use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use tracing::{debug, error, warn};

use crate::cache::{CachedResponse, ResponseCache, SetMode, HELP_CACHE_KEY};
use crate::error::{CacheError, UpstreamError};
use crate::models::{HealthResponse, ListingQuery};
use crate::upstream::UpstreamClient;

// == Content Types ==
pub const TEXT_HTML: &str = "text/html";
pub const BITTORRENT: &str = "application/x-bittorrent";

/// Result of a mirrored request: the upstream reply or why there is none.
pub type MirrorResult = std::result::Result<CachedResponse, UpstreamError>;

/// Application state shared across all handlers.
///
/// Every field is a cheap handle; cloning the state clones no data.
#[derive(Clone)]
pub struct AppState {
    /// Response cache over the configured store
    pub cache: ResponseCache,
    /// Client for the mirrored site
    pub upstream: UpstreamClient,
    /// Lifetime of the cached help page, in seconds
    pub help_ttl: u64,
}

impl AppState {
    /// Creates a new AppState from already-built collaborators.
    pub fn new(cache: ResponseCache, upstream: UpstreamClient, help_ttl: u64) -> Self {
        Self {
            cache,
            upstream,
            help_ttl,
        }
    }
}

/// Handler for GET /
///
/// Forwards the raw query string as is. A `page` parameter switches the
/// listing to XML.
pub async fn listing_handler(State(state): State<AppState>, RawQuery(raw): RawQuery) -> MirrorResult {
    let listing = ListingQuery::parse(raw.as_deref());
    state
        .upstream
        .fetch(&[], raw.as_deref(), listing.content_type())
        .await
}

/// Handler for GET /view/:view_id
pub async fn view_handler(State(state): State<AppState>, Path(view_id): Path<u64>) -> MirrorResult {
    let view_id = view_id.to_string();
    state.upstream.fetch(&["view", view_id.as_str()], None, TEXT_HTML).await
}

/// Handler for GET /download/:torrent
///
/// The body is passed through as bytes; torrent files are binary.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(torrent): Path<String>,
) -> MirrorResult {
    state
        .upstream
        .fetch(&["download", torrent.as_str()], None, BITTORRENT)
        .await
}

/// Handler for GET /user/:username
pub async fn user_handler(State(state): State<AppState>, Path(username): Path<String>) -> MirrorResult {
    state.upstream.fetch(&["user", username.as_str()], None, TEXT_HTML).await
}

/// Handler for GET /rules
pub async fn rules_handler(State(state): State<AppState>) -> MirrorResult {
    state.upstream.fetch(&["rules"], None, TEXT_HTML).await
}

/// Handler for GET /login
pub async fn login_handler(State(state): State<AppState>) -> MirrorResult {
    state.upstream.fetch(&["login"], None, TEXT_HTML).await
}

/// Handler for GET /register
pub async fn register_handler(State(state): State<AppState>) -> MirrorResult {
    state.upstream.fetch(&["register"], None, TEXT_HTML).await
}

/// Handler for GET /upload
pub async fn upload_handler(State(state): State<AppState>) -> MirrorResult {
    state.upstream.fetch(&["upload"], None, TEXT_HTML).await
}

/// Handler for GET /help
///
/// Served from the cache when possible; filled once per TTL otherwise.
pub async fn help_handler(State(state): State<AppState>) -> MirrorResult {
    serve_cached(&state, HELP_CACHE_KEY, &["help"], TEXT_HTML, state.help_ttl).await
}

/// Handler for GET /health
///
/// Reports whether the cache store answers. The proxy keeps working without
/// it, so this never fails.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = match state.cache.ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!(store = state.cache.backend(), error = %err, "cache store ping failed");
            false
        }
    };
    Json(HealthResponse::new(state.cache.backend(), reachable))
}

// == Cached Fetch ==
/// Serves `key` from the cache, falling back to upstream.
///
/// Cache failures of any kind only cost the cache: they are logged and the
/// page is fetched from upstream. Only successful upstream replies are
/// written back, with a set-if-absent so concurrent misses fill the key once.
async fn serve_cached(
    state: &AppState,
    key: &str,
    segments: &[&str],
    content_type: &str,
    ttl: u64,
) -> MirrorResult {
    match state.cache.get(key).await {
        Ok(Some(hit)) => {
            debug!(key, "cache hit");
            return Ok(hit);
        }
        Ok(None) => debug!(key, "cache miss"),
        Err(CacheError::Decode(err)) => {
            warn!(key, error = %err, "discarding undecodable cache entry");
            // An IfAbsent refill cannot land while the corrupt value sits there.
            if let Err(err) = state.cache.delete(key).await {
                warn!(key, error = %err, "failed to remove undecodable cache entry");
            }
        }
        Err(err) if err.is_unavailable() => {
            warn!(key, error = %err, "cache store unavailable, serving from upstream")
        }
        Err(err) => error!(key, error = %err, "cache lookup failed, serving from upstream"),
    }

    let response = state.upstream.fetch(segments, None, content_type).await?;

    match state
        .cache
        .set(key, &response, Some(ttl), SetMode::IfAbsent)
        .await
    {
        Ok(true) => debug!(key, ttl, "cached upstream reply"),
        Ok(false) => debug!(key, "cache already filled by a concurrent request"),
        Err(err) if err.is_unavailable() => {
            warn!(key, error = %err, "cache store unavailable, reply not cached")
        }
        Err(err) => error!(key, error = %err, "failed to cache upstream reply"),
    }

    Ok(response)
}
