//! Upstream Client
//!
//! Performs GET requests against the mirrored site and turns the replies
//! into [`CachedResponse`] values.

use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use crate::cache::CachedResponse;
use crate::config::Config;
use crate::error::UpstreamError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/101.0.4951.67 Safari/537.36";

// == Upstream Client ==
/// HTTP client bound to one upstream base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
}

impl UpstreamClient {
    // == Constructor ==
    /// Creates a client for `base` with a per-request `timeout`.
    pub fn new(base: Url, timeout: Duration) -> anyhow::Result<Self> {
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            bail!("upstream URL {} is not an http(s) base URL", base);
        }

        let http = reqwest::Client::builder()
            .default_headers(browser_headers(&base)?)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build upstream HTTP client")?;

        Ok(Self { http, base })
    }

    /// Creates a client from the `UPSTREAM_URL` and `UPSTREAM_TIMEOUT` settings.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let base = Url::parse(&config.upstream_url)
            .with_context(|| format!("invalid upstream URL {:?}", config.upstream_url))?;
        Self::new(base, config.upstream_timeout())
    }

    /// Base URL of the mirrored site.
    pub fn base(&self) -> &Url {
        &self.base
    }

    // == Target ==
    /// Builds the upstream URL for `segments` and an optional raw query.
    ///
    /// Each segment is percent-encoded on its own, so a parameter can never
    /// escape its path position.
    pub fn target(&self, segments: &[&str], query: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if !segments.is_empty() {
            // new() rejected cannot-be-a-base URLs
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty().extend(segments);
            }
        }
        url.set_query(query.filter(|q| !q.is_empty()));
        url
    }

    // == Fetch ==
    /// GETs `segments` upstream and labels the reply with `content_type`.
    ///
    /// # Errors
    /// * [`UpstreamError::Transport`] when no complete reply arrived
    /// * [`UpstreamError::Status`] when upstream answered with a non-2xx
    ///   status; the reply is kept so it can be mirrored
    pub async fn fetch(
        &self,
        segments: &[&str],
        query: Option<&str>,
        content_type: &str,
    ) -> Result<CachedResponse, UpstreamError> {
        let target = self.target(segments, query);
        debug!(url = %target, "fetching upstream");

        let transport = |source: reqwest::Error| {
            warn!(url = %target, error = %source, "upstream request failed");
            UpstreamError::Transport {
                target: target.to_string(),
                source,
            }
        };

        let reply = self.http.get(target.clone()).send().await.map_err(transport)?;
        let status = reply.status();
        let body = reply.bytes().await.map_err(transport)?;

        let response = CachedResponse::new(status, content_type, body);
        if !response.is_success() {
            warn!(url = %target, status = %status, "upstream answered with an error status");
            return Err(UpstreamError::Status {
                target: target.to_string(),
                response: Box::new(response),
            });
        }

        debug!(url = %target, bytes = response.body.len(), "upstream reply received");
        Ok(response)
    }
}

/// Request headers a browser would send to the site.
fn browser_headers(base: &Url) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

    let mut referer = base.clone();
    referer.set_query(None);
    referer.set_path("/");
    headers.insert(
        header::REFERER,
        HeaderValue::from_str(referer.as_str()).context("upstream URL is not a valid referer")?,
    );

    Ok(headers)
}
