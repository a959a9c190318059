//! Request and Response models for the proxy's own endpoints
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing query strings and JSON bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ListingQuery;
pub use responses::{ErrorResponse, HealthResponse};
