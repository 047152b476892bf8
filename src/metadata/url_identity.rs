//! URL identity and domain extraction
//!
//! Parses a raw URL into the pieces the rest of the pipeline keys on: the
//! hostname (used as domain, fallback title and site name) and the non-empty
//! path segments (used to humanize a fallback title).

use tracing::debug;
use url::Url;

use crate::metadata::error::MetadataError;

/// Parsed identity of a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlIdentity {
    /// Parsed URL, used for fetching and resolving relative references
    pub url: Url,

    /// Hostname of the URL
    pub hostname: String,

    /// Path exactly as the URL parser serialises it, always starting with `/`
    pub path: String,

    /// Non-empty path segments in order
    pub path_segments: Vec<String>,
}

impl UrlIdentity {
    /// Parse a URL string
    ///
    /// Only absolute `http`/`https` URLs with a host are accepted. Callers that
    /// accept user input without a scheme should run it through
    /// [`normalize_input`] first.
    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        let invalid = |reason: String| {
            debug!(url = raw, reason = %reason, "rejecting url");
            MetadataError::InvalidUrl {
                url: raw.to_string(),
                reason,
            }
        };

        let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        let hostname = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(invalid("missing host".to_string())),
        };

        let path = url.path().to_string();
        let path_segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            url,
            hostname,
            path,
            path_segments,
        })
    }

    /// Whether the URL points at the site root (empty path or `/`)
    pub fn is_root(&self) -> bool {
        self.path.is_empty() || self.path == "/"
    }

    /// Last non-empty path segment, if any
    pub fn last_segment(&self) -> Option<&str> {
        self.path_segments.last().map(String::as_str)
    }
}

/// Prepend `https://` to user input that carries no http(s) scheme
pub fn normalize_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
