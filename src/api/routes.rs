//! API Routes
//!
//! Configures the Axum router with the mirrored paths and the proxy's own
//! endpoints.

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{
    download_handler, health_handler, help_handler, listing_handler, login_handler,
    register_handler, rules_handler, upload_handler, user_handler, view_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Listing, query forwarded
/// - `GET /view/:view_id` - Entry page
/// - `GET /download/:torrent` - Torrent file
/// - `GET /user/:username` - User page
/// - `GET /rules`, `/help`, `/login`, `/register`, `/upload` - Static pages
/// - `GET /health` - Health check endpoint
/// - `GET /static/*` - Files from `static_dir`, when given
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(listing_handler))
        .route("/view/:view_id", get(view_handler))
        .route("/download/:torrent", get(download_handler))
        .route("/user/:username", get(user_handler))
        .route("/rules", get(rules_handler))
        .route("/help", get(help_handler))
        .route("/login", get(login_handler))
        .route("/register", get(register_handler))
        .route("/upload", get(upload_handler))
        .route("/health", get(health_handler));

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, ResponseCache};
    use crate::upstream::UpstreamClient;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(1));
        // Nothing listens on port 9; no test here reaches upstream.
        let upstream = UpstreamClient::new(
            url::Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        create_router(AppState::new(cache, upstream, 60), None)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_view_requires_numeric_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/view/not-a-number")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_path_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/app.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_get_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/help")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
