//! Cached Response Module
//!
//! The unit of storage: status, content type and body of an upstream reply.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

// == Cached Response ==
/// A full HTTP response as persisted in the cache.
///
/// Only these three fields survive a round trip through the store; other
/// upstream headers are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Value of the `Content-Type` header
    pub content_type: String,
    /// Raw payload, not assumed to be text
    pub body: Bytes,
}

impl CachedResponse {
    /// Creates a new CachedResponse.
    pub fn new(status: StatusCode, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match HeaderValue::from_str(&self.content_type) {
            Ok(value) => {
                response.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            Err(_) => {
                tracing::warn!(
                    content_type = %self.content_type,
                    "dropping content type that is not a valid header value"
                );
            }
        }
        response
    }
}
