//! Response DTOs for the proxy's own endpoints
//!
//! Defines the structure of outgoing JSON bodies. Mirrored pages are not
//! modelled here; they pass through as raw bytes.

use serde::Serialize;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when the cache store does not answer
    pub status: String,
    /// Cache backend name ("redis" or "memory")
    pub store: String,
    /// Whether the store answered a ping
    pub store_reachable: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a HealthResponse with the current timestamp.
    ///
    /// The proxy keeps serving without its cache, so an unreachable store
    /// only degrades the status.
    pub fn new(store: impl Into<String>, store_reachable: bool) -> Self {
        let status = if store_reachable { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            store: store.into(),
            store_reachable,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for failures of the proxy itself
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
