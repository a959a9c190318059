//! Error types for the mirror proxy
//!
//! Provides typed errors for the codec, the cache layer and the upstream
//! client using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::CachedResponse;
use crate::models::ErrorResponse;

// == Decode Error Enum ==
/// Reasons a stored blob cannot be turned back into a [`CachedResponse`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Blob is not a valid hex string
    #[error("blob is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Blob was not produced by this codec
    #[error("blob does not start with the response marker")]
    BadMagic,

    /// Blob was produced by an unknown codec version
    #[error("unsupported encoding version {0}")]
    UnsupportedVersion(u8),

    /// Stored status code is outside 100..=999
    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    /// Stored content type is not UTF-8
    #[error("content type is not valid UTF-8")]
    InvalidContentType,

    /// Blob ended before a field was complete
    #[error("blob truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: u64, remaining: usize },

    /// Blob carries bytes past the encoded body
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// A miss (`Ok(None)` from `get`) and a lost conditional write (`Ok(false)`
/// from `set`) are not errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty, not ASCII, or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// TTL is zero or beyond what the store accepts
    #[error("TTL of {0} seconds is out of range")]
    InvalidTtl(u64),

    /// Stored value exists but cannot be decoded
    #[error("Undecodable cache entry: {0}")]
    Decode(#[from] DecodeError),

    /// Store cannot be reached or did not answer in time
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store answered with an error reply
    #[error("Store error: {0}")]
    Store(String),
}

impl CacheError {
    /// Returns true when the failure is a connectivity problem rather than a
    /// rejected command.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::StoreUnavailable(_))
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
        {
            CacheError::StoreUnavailable(err.to_string())
        } else {
            CacheError::Store(err.to_string())
        }
    }
}

// == Upstream Error Enum ==
/// Failure of a request to the mirrored site.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Connection, timeout or body read failure
    #[error("request to {target} failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status
    #[error("{target} answered with status {}", .response.status)]
    Status {
        target: String,
        response: Box<CachedResponse>,
    },
}

// == IntoResponse Implementation ==
impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        match self {
            // Mirror whatever upstream said, body included.
            UpstreamError::Status { response, .. } => response.into_response(),
            UpstreamError::Transport { .. } => {
                let body = Json(ErrorResponse::new("upstream site is unreachable"));
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
