//! Fallback synthesis from URL structure
//!
//! Builds a plausible preview when no document is available: the hostname
//! stands in for the site, the last path segment is humanized into a title,
//! and the favicon comes from a favicon-by-domain service.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use crate::metadata::extraction::{
    DESCRIPTION_MAX_CHARS, SITE_NAME_MAX_CHARS, TITLE_MAX_CHARS, truncate_chars,
};
use crate::metadata::url_identity::UrlIdentity;

/// Favicon-by-domain endpoint
pub const FAVICON_SERVICE_URL: &str = "https://www.google.com/s2/favicons";

static FAVICON_SERVICE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(FAVICON_SERVICE_URL).expect("favicon service url is valid"));

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]").expect("separator regex is valid"));

static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[^.]*$").expect("extension regex is valid"));

static WORD_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w").expect("word start regex is valid"));

/// Preview fields derived from the URL alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub title: String,
    pub description: String,
    pub site_name: String,
    pub favicon: String,
    pub domain: String,
}

/// Synthesize a complete preview from the URL structure
///
/// Never fails; every field is non-empty.
pub fn synthesize(identity: &UrlIdentity, favicon_size: u32) -> Fallback {
    let domain = identity.hostname.clone();

    let title = identity
        .last_segment()
        .map(humanize_segment)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| domain.clone());

    Fallback {
        title: truncate_chars(&title, TITLE_MAX_CHARS),
        description: truncate_chars(&visit_description(identity), DESCRIPTION_MAX_CHARS),
        site_name: truncate_chars(&domain, SITE_NAME_MAX_CHARS),
        favicon: favicon_service_url(&domain, favicon_size),
        domain,
    }
}

/// `Visit {domain}{path}`, with the path omitted for the site root
pub fn visit_description(identity: &UrlIdentity) -> String {
    if identity.is_root() {
        format!("Visit {}", identity.hostname)
    } else {
        format!("Visit {}{}", identity.hostname, identity.path)
    }
}

/// Turn a path segment into a title: separators become spaces, a trailing
/// file extension is dropped, and every word is capitalised
pub fn humanize_segment(segment: &str) -> String {
    let spaced = SEPARATOR_RE.replace_all(segment, " ");
    let stem = EXTENSION_RE.replace(&spaced, "");
    WORD_START_RE
        .replace_all(&stem, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Favicon service URL for a domain
pub fn favicon_service_url(domain: &str, size: u32) -> String {
    let mut url = FAVICON_SERVICE.clone();
    url.query_pairs_mut()
        .append_pair("domain", domain)
        .append_pair("sz", &size.to_string());
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback(raw: &str) -> Fallback {
        synthesize(&UrlIdentity::parse(raw).unwrap(), 32)
    }

    #[test]
    fn test_humanizes_last_path_segment() {
        let result = fallback("https://example.com/my-cool_article.html");

        assert_eq!(result.title, "My Cool Article");
        assert_eq!(result.description, "Visit example.com/my-cool_article.html");
        assert_eq!(result.domain, "example.com");
        assert_eq!(result.site_name, "example.com");
    }

    #[test]
    fn test_root_url_uses_domain() {
        let result = fallback("https://example.com/");

        assert_eq!(result.title, "example.com");
        assert_eq!(result.description, "Visit example.com");
    }

    #[test]
    fn test_trailing_slash_uses_last_non_empty_segment() {
        let result = fallback("https://example.com/docs/getting-started/");

        assert_eq!(result.title, "Getting Started");
        assert_eq!(result.description, "Visit example.com/docs/getting-started/");
    }

    #[test]
    fn test_query_string_is_not_part_of_description() {
        let result = fallback("https://example.com/search?q=rust");
        assert_eq!(result.title, "Search");
        assert_eq!(result.description, "Visit example.com/search");
    }

    #[test]
    fn test_extension_only_segment_falls_back_to_domain() {
        let result = fallback("https://example.com/.html");
        assert_eq!(result.title, "example.com");
    }

    #[test]
    fn test_humanize_segment() {
        assert_eq!(humanize_segment("release-notes_v2"), "Release Notes V2");
        assert_eq!(humanize_segment("archive.tar.gz"), "Archive.Tar");
        assert_eq!(humanize_segment("README"), "README");
    }

    #[test]
    fn test_favicon_service_url() {
        assert_eq!(
            favicon_service_url("example.com", 32),
            "https://www.google.com/s2/favicons?domain=example.com&sz=32"
        );

        let result = fallback("https://sub.example.org/page");
        assert_eq!(
            result.favicon,
            "https://www.google.com/s2/favicons?domain=sub.example.org&sz=32"
        );
    }
}
