//! API Module
//!
//! HTTP handlers and routing for the mirror.
//!
//! # Endpoints
//! - `GET /`, `/view/:view_id`, `/download/:torrent`, `/user/:username`,
//!   `/rules`, `/help`, `/login`, `/register`, `/upload` - Mirrored upstream pages
//! - `GET /health` - Health check endpoint
//! - `GET /static/*` - Local static files

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
