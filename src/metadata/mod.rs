//! # Link Metadata Module
//!
//! This module resolves an arbitrary URL into the preview shown on a
//! collection card: title, description, site name, favicon and domain. It is
//! the only part of URL List that talks to the network on behalf of users.
//!
//! ## Key Components
//!
//! - `UrlIdentity`: Parsed URL with hostname and path segments
//! - `extract_metadata`: Ordered candidate extraction from an HTML document
//! - `HttpFetcher`: Browser-like HTTP GET with timeout and redirect following
//! - `synthesize`: Preview derived purely from the URL structure
//! - `MetadataCache`: URL-keyed cache of resolved records
//! - `Resolver`: Orchestrates cache, fetch, extraction and fallback
//!
//! ## Resolution flow
//!
//! The resolver validates the URL, consults the cache, and on a miss fetches
//! the page. A fetched document is run through the extractor and any field it
//! could not fill is taken from the URL-derived fallback. A failed fetch uses
//! the fallback alone. The final record is cached under the original input
//! string. Only an unparsable URL surfaces as an error.

mod cache;
mod config;
mod error;
mod extraction;
mod fallback;
mod fetcher;
mod resolver;
mod url_identity;

pub use cache::MetadataCache;
pub use config::{ResolverConfig, ResolverConfigBuilder};
pub use error::{FetchError, MetadataError};
pub use extraction::{
    DESCRIPTION_MAX_CHARS, ExtractedMetadata, SITE_NAME_MAX_CHARS, TITLE_MAX_CHARS,
    extract_metadata,
};
pub use fallback::{Fallback, favicon_service_url, humanize_segment, synthesize};
pub use fetcher::{Fetch, HttpFetcher};
pub use resolver::Resolver;
pub use url_identity::{UrlIdentity, normalize_input};

use serde::{Deserialize, Serialize};

/// Resolved preview of a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    /// The original, unmodified input string
    pub url: String,

    /// Display title, at most 200 characters
    pub title: String,

    /// Display summary, at most 300 characters
    pub description: Option<String>,

    /// Site name, at most 100 characters
    pub site_name: String,

    /// Favicon image URL
    pub favicon: String,

    /// Hostname of the link
    pub domain: String,
}

/// Per-link resolution state as seen by a collection view
///
/// Starts out loading and settles exactly once, either with the full
/// metadata or with an error message. Settling consumes the loading state,
/// so a settled value can never go back to loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUrlState {
    pub url: String,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl PendingUrlState {
    /// A freshly registered URL with no metadata yet
    pub fn loading(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            loading: true,
            error: None,
            title: None,
            description: None,
            site_name: None,
            favicon: None,
            domain: None,
        }
    }

    /// Settle with the outcome of a resolution
    ///
    /// A state that has already settled is returned unchanged.
    pub fn settle(self, outcome: Result<LinkMetadata, MetadataError>) -> Self {
        if !self.loading {
            return self;
        }

        match outcome {
            Ok(metadata) => Self {
                url: self.url,
                loading: false,
                error: None,
                title: Some(metadata.title),
                description: metadata.description,
                site_name: Some(metadata.site_name),
                favicon: Some(metadata.favicon),
                domain: Some(metadata.domain),
            },
            Err(err) => Self {
                error: Some(err.to_string()),
                loading: false,
                ..Self::loading(self.url)
            },
        }
    }

    /// Whether the state settled successfully
    pub fn is_resolved(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> LinkMetadata {
        LinkMetadata {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            description: None,
            site_name: "Example Site".to_string(),
            favicon: "https://example.com/favicon.ico".to_string(),
            domain: "example.com".to_string(),
        }
    }

    #[test]
    fn test_link_metadata_serializes_camel_case() {
        let json = serde_json::to_value(metadata()).unwrap();

        assert_eq!(json["siteName"], "Example Site");
        assert_eq!(json["description"], serde_json::Value::Null);
        assert_eq!(json["domain"], "example.com");
    }

    #[test]
    fn test_pending_state_settles_with_metadata() {
        let state = PendingUrlState::loading("https://example.com");
        assert!(state.loading);
        assert!(!state.is_resolved());

        let state = state.settle(Ok(metadata()));
        assert!(!state.loading);
        assert!(state.is_resolved());
        assert_eq!(state.title.as_deref(), Some("Example"));
        assert_eq!(state.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_pending_state_settles_with_error() {
        let err = MetadataError::InvalidUrl {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };

        let state = PendingUrlState::loading("not a url").settle(Err(err));
        assert!(!state.loading);
        assert!(state.error.is_some());
        assert_eq!(state.title, None);
        assert!(!state.is_resolved());
    }

    #[test]
    fn test_settled_state_does_not_change() {
        let state = PendingUrlState::loading("https://example.com").settle(Ok(metadata()));
        let again = state.clone().settle(Err(MetadataError::Fetch(FetchError::Timeout)));
        assert_eq!(state, again);
    }
}
