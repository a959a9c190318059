//! Mirror Proxy - A caching reverse proxy for a single upstream site
//!
//! Forwards requests to fixed upstream paths and keeps whole responses in a
//! Redis-backed cache with TTL expiry and set-if-absent writes.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mirror_proxy::cache::{KvStore, MemoryStore, RedisStore};
use mirror_proxy::upstream::UpstreamClient;
use mirror_proxy::{create_router, spawn_cleanup_task, AppState, Config, ResponseCache};

/// Main entry point for the mirror proxy.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Create the cache store (Redis, or in-process with a cleanup task)
/// 4. Create the upstream client
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured address
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_json);

    info!("Starting Mirror Proxy");
    info!(
        help_ttl = config.help_ttl,
        store_timeout_ms = config.store_timeout_ms,
        "Configuration loaded"
    );

    // The store handle is built here and handed to the cache; nothing else
    // owns a connection.
    let mut cleanup_handle: Option<JoinHandle<()>> = None;
    let store: Arc<dyn KvStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisStore::open(url).context("invalid REDIS_URL")?;
            info!("Using redis cache store");
            Arc::new(store)
        }
        None => {
            warn!("REDIS_URL not set, caching in process memory");
            let store = Arc::new(MemoryStore::new());
            cleanup_handle = Some(spawn_cleanup_task(store.clone(), config.cleanup_interval));
            store
        }
    };

    let cache = ResponseCache::new(store, config.store_timeout());
    let upstream = UpstreamClient::from_config(&config)?;
    info!(upstream = %upstream.base(), "Mirroring upstream site");
    let state = AppState::new(cache, upstream, config.help_ttl);

    let static_dir = config.static_dir.is_dir().then_some(config.static_dir.as_path());
    if static_dir.is_none() {
        warn!(dir = %config.static_dir.display(), "static directory not found, /static disabled");
    }
    let app = create_router(state, static_dir);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Installs the global subscriber.
///
/// Defaults to "info" level, can be overridden with RUST_LOG.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mirror_proxy=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task if one runs.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
