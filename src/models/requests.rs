//! Request DTOs for the mirror endpoints
//!
//! Defines the parts of incoming query strings the proxy itself looks at.
//! Everything else is forwarded upstream untouched.

use url::form_urlencoded;

/// Query parameters of the listing endpoint (GET /)
///
/// Read from the raw query string rather than through a typed extractor:
/// upstream accepts repeated keys, so the proxy must too.
///
/// # Fields
/// - `page`: First `page` value, present for feed-style listings (e.g. `page=rss`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Alternate listing format requested by the client
    pub page: Option<String>,
}

impl ListingQuery {
    /// Picks the parameters of interest out of a raw query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let page = raw.and_then(|raw| {
            form_urlencoded::parse(raw.as_bytes())
                .find(|(name, _)| name == "page")
                .map(|(_, value)| value.into_owned())
        });
        Self { page }
    }

    /// Content type of the mirrored listing.
    ///
    /// Upstream serves XML whenever a `page` parameter is given, HTML otherwise.
    pub fn content_type(&self) -> &'static str {
        if self.page.is_some() {
            "application/xml"
        } else {
            "text/html"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_query_with_page() {
        let query = ListingQuery::parse(Some("q=foo&page=rss"));
        assert_eq!(query.page.as_deref(), Some("rss"));
        assert_eq!(query.content_type(), "application/xml");
    }

    #[test]
    fn test_listing_query_without_page() {
        for raw in [None, Some(""), Some("q=page&c=1_2")] {
            let query = ListingQuery::parse(raw);
            assert!(query.page.is_none(), "{:?}", raw);
            assert_eq!(query.content_type(), "text/html");
        }
    }

    #[test]
    fn test_repeated_page_keeps_first() {
        let query = ListingQuery::parse(Some("page=rss&page=2"));
        assert_eq!(query.page.as_deref(), Some("rss"));
    }

    #[test]
    fn test_empty_page_still_counts() {
        assert_eq!(ListingQuery::parse(Some("page")).content_type(), "application/xml");
        assert_eq!(ListingQuery::parse(Some("page=")).content_type(), "application/xml");
    }

    #[test]
    fn test_malformed_query_does_not_fail() {
        let query = ListingQuery::parse(Some("%zz=1&&=&page=%E2%9C"));
        assert!(query.page.is_some());
    }
}
