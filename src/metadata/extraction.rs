//! # HTML Metadata Extraction Module
//!
//! Turns a raw HTML document into the display fields of a link preview. The
//! document is parsed with a tolerant HTML5 parser and meta tags are queried
//! structurally, so attribute order, quoting style and entity encoding in the
//! source markup do not matter.
//!
//! ## Candidate order (first non-empty value wins)
//!
//! - title: `og:title`, `twitter:title`, `<meta name="title">`, `<title>`, hostname
//! - description: `og:description`, `twitter:description`,
//!   `<meta name="description">`, `twitter:card`, otherwise absent
//! - site name: `og:site_name`, `application-name`,
//!   `apple-mobile-web-app-title`, hostname
//! - favicon: first `<link>` whose `rel` contains an `icon` token, resolved
//!   against the page URL
//!
//! Every string is hard-truncated to its field limit before it is returned.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::instrument;

use crate::metadata::url_identity::UrlIdentity;

/// Maximum title length in characters
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum description length in characters
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// Maximum site name length in characters
pub const SITE_NAME_MAX_CHARS: usize = 100;

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("meta selector is valid"));

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

static ICON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel][href]").expect("link selector is valid"));

// The parser decodes <title> as raw text, so nested markup is stripped from the
// source before entities are decoded
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("title regex is valid")
});

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup regex is valid"));

/// Fields extracted from a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// Display title, falls back to the hostname
    pub title: String,

    /// Display summary, absent when no candidate matched
    pub description: Option<String>,

    /// Site name, falls back to the hostname
    pub site_name: String,

    /// Absolute favicon URL scraped from the document
    pub favicon: Option<String>,
}

/// Meta tag values keyed by `property:<key>` / `name:<key>`, keys lowercased
#[derive(Debug, Default)]
struct MetaTags(HashMap<String, String>);

impl MetaTags {
    fn collect(document: &Html) -> Self {
        let mut tags = HashMap::new();

        for element in document.select(&META_SELECTOR) {
            let element = element.value();
            let Some(content) = element.attr("content").and_then(clean_text) else {
                continue;
            };

            for attribute in ["property", "name"] {
                if let Some(key) = element.attr(attribute) {
                    tags.entry(format!("{}:{}", attribute, key.trim().to_lowercase()))
                        .or_insert_with(|| content.clone());
                }
            }
        }

        Self(tags)
    }

    /// Open Graph and Twitter keys, published under either attribute
    fn property(&self, key: &str) -> Option<String> {
        self.0
            .get(&format!("property:{}", key))
            .or_else(|| self.0.get(&format!("name:{}", key)))
            .cloned()
    }

    fn name(&self, key: &str) -> Option<String> {
        self.0.get(&format!("name:{}", key)).cloned()
    }
}

/// Extract title, description, site name and favicon from an HTML document
///
/// # Arguments
///
/// * `html` - The document text
/// * `identity` - The page's parsed URL, used for the hostname fallback and to
///   resolve relative favicon references
///
/// # Returns
///
/// The extracted fields. Never fails: unmatched fields fall back to the
/// hostname (title, site name) or stay absent (description, favicon).
#[instrument(skip(html, identity), fields(url = %identity.url, html_len = html.len()))]
pub fn extract_metadata(html: &str, identity: &UrlIdentity) -> ExtractedMetadata {
    let document = Html::parse_document(html);
    let meta = MetaTags::collect(&document);

    let title = meta
        .property("og:title")
        .or_else(|| meta.property("twitter:title"))
        .or_else(|| meta.name("title"))
        .or_else(|| title_text(html, &document))
        .unwrap_or_else(|| identity.hostname.clone());

    let description = meta
        .property("og:description")
        .or_else(|| meta.property("twitter:description"))
        .or_else(|| meta.name("description"))
        .or_else(|| meta.property("twitter:card"));

    let site_name = meta
        .property("og:site_name")
        .or_else(|| meta.name("application-name"))
        .or_else(|| meta.name("apple-mobile-web-app-title"))
        .unwrap_or_else(|| identity.hostname.clone());

    ExtractedMetadata {
        title: truncate_chars(&title, TITLE_MAX_CHARS),
        description: description.map(|d| truncate_chars(&d, DESCRIPTION_MAX_CHARS)),
        site_name: truncate_chars(&site_name, SITE_NAME_MAX_CHARS),
        favicon: find_favicon(&document, identity),
    }
}

fn title_text(html: &str, document: &Html) -> Option<String> {
    match TITLE_RE.captures(html).and_then(|captures| captures.get(1)) {
        Some(source) => {
            let stripped = MARKUP_RE.replace_all(source.as_str(), "");
            clean_text(&decode_entities(&stripped))
        }
        // Unterminated <title>: the parser already ran to the end of the input
        None => {
            let element = document.select(&TITLE_SELECTOR).next()?;
            clean_text(&element.text().collect::<String>())
        }
    }
}

fn decode_entities(text: &str) -> String {
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect()
}

fn find_favicon(document: &Html, identity: &UrlIdentity) -> Option<String> {
    document
        .select(&ICON_SELECTOR)
        .filter(|element| {
            element.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| token.to_ascii_lowercase().contains("icon"))
            })
        })
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| identity.url.join(href).ok())
        .find(|resolved| matches!(resolved.scheme(), "http" | "https"))
        .map(|resolved| resolved.to_string())
}

/// Normalise non-breaking spaces, trim, and drop empty values
fn clean_text(value: &str) -> Option<String> {
    let cleaned = value.replace('\u{a0}', " ");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Hard-truncate to at most `max_chars` characters
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> UrlIdentity {
        UrlIdentity::parse("https://example.com/articles/one").unwrap()
    }

    fn document(head: &[&str]) -> String {
        ["<html>", "<head>"]
            .into_iter()
            .chain(head.iter().copied())
            .chain(["</head>", "<body></body>", "</html>"])
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_attribute_order_is_irrelevant() {
        let property_first = document(&[r#"<meta property="og:title" content="X">"#]);
        let content_first = document(&[r#"<meta content="X" property="og:title">"#]);

        assert_eq!(extract_metadata(&property_first, &identity()).title, "X");
        assert_eq!(extract_metadata(&content_first, &identity()).title, "X");
    }

    #[test]
    fn test_single_quoted_attributes() {
        let html = document(&["<meta content='Quoted' name='description'>"]);
        let metadata = extract_metadata(&html, &identity());
        assert_eq!(metadata.description.as_deref(), Some("Quoted"));
    }

    #[test]
    fn test_title_candidate_order() {
        let html = document(&[
            "<title>Tag Title</title>",
            r#"<meta name="title" content="Meta Title">"#,
            r#"<meta name="twitter:title" content="Twitter Title">"#,
            r#"<meta property="og:title" content="OG Title">"#,
        ]);
        assert_eq!(extract_metadata(&html, &identity()).title, "OG Title");

        let html = document(&[
            "<title>Tag Title</title>",
            r#"<meta name="title" content="Meta Title">"#,
            r#"<meta name="twitter:title" content="Twitter Title">"#,
        ]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Twitter Title");

        let html = document(&[
            "<title>Tag Title</title>",
            r#"<meta name="title" content="Meta Title">"#,
        ]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Meta Title");

        let html = document(&["<title>Tag Title</title>"]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Tag Title");
    }

    #[test]
    fn test_title_falls_back_to_hostname() {
        let html = document(&[]);
        let metadata = extract_metadata(&html, &identity());

        assert_eq!(metadata.title, "example.com");
        assert_eq!(metadata.site_name, "example.com");
        assert_eq!(metadata.description, None);
        assert_eq!(metadata.favicon, None);
    }

    #[test]
    fn test_empty_candidates_are_skipped() {
        let html = document(&[
            r#"<meta property="og:title" content="   ">"#,
            "<title>Real Title</title>",
        ]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Real Title");
    }

    #[test]
    fn test_description_candidate_order() {
        let html = document(&[
            r#"<meta name="twitter:card" content="summary">"#,
            r#"<meta name="description" content="Plain description">"#,
        ]);
        let metadata = extract_metadata(&html, &identity());
        assert_eq!(metadata.description.as_deref(), Some("Plain description"));

        let html = document(&[r#"<meta name="twitter:card" content="summary_large_image">"#]);
        let metadata = extract_metadata(&html, &identity());
        assert_eq!(metadata.description.as_deref(), Some("summary_large_image"));

        let html = document(&[
            r#"<meta name="description" content="Plain description">"#,
            r#"<meta property="og:description" content="OG description">"#,
        ]);
        let metadata = extract_metadata(&html, &identity());
        assert_eq!(metadata.description.as_deref(), Some("OG description"));
    }

    #[test]
    fn test_site_name_candidate_order() {
        let html = document(&[
            r#"<meta name="apple-mobile-web-app-title" content="Apple Name">"#,
            r#"<meta name="application-name" content="App Name">"#,
        ]);
        assert_eq!(extract_metadata(&html, &identity()).site_name, "App Name");

        let html = document(&[
            r#"<meta name="application-name" content="App Name">"#,
            r#"<meta property="og:site_name" content="Example Site">"#,
        ]);
        assert_eq!(extract_metadata(&html, &identity()).site_name, "Example Site");
    }

    #[test]
    fn test_entity_decoding() {
        let html = document(&["<title>Fish &amp; Chips</title>"]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Fish & Chips");

        let html = document(&[
            r#"<meta property="og:description" content="&lt;b&gt; &quot;quoted&quot; &#39;single&#39;&nbsp;end">"#,
        ]);
        let metadata = extract_metadata(&html, &identity());
        assert_eq!(
            metadata.description.as_deref(),
            Some(r#"<b> "quoted" 'single' end"#)
        );
    }

    #[test]
    fn test_title_strips_nested_markup_and_whitespace() {
        let html = document(&["<title>\n   Hello <b>World</b>  \n</title>"]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Hello World");
    }

    #[test]
    fn test_title_keeps_encoded_angle_brackets() {
        let html = document(&["<title>Vec&lt;T&gt; in std::vec</title>"]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Vec<T> in std::vec");

        let html = document(&["<title>Option&lt;<i>T</i>&gt; &amp;mut</title>"]);
        assert_eq!(extract_metadata(&html, &identity()).title, "Option<T> &mut");
    }

    #[test]
    fn test_truncation_contract() {
        let long_title = "a".repeat(250);
        let long_description = "b".repeat(400);
        let long_site = "c".repeat(150);
        let og_title = format!(r#"<meta property="og:title" content="{}">"#, long_title);
        let og_description = format!(
            r#"<meta property="og:description" content="{}">"#,
            long_description
        );
        let og_site = format!(r#"<meta property="og:site_name" content="{}">"#, long_site);
        let html = document(&[og_title.as_str(), og_description.as_str(), og_site.as_str()]);

        let metadata = extract_metadata(&html, &identity());
        assert_eq!(metadata.title.chars().count(), TITLE_MAX_CHARS);
        assert_eq!(
            metadata.description.unwrap().chars().count(),
            DESCRIPTION_MAX_CHARS
        );
        assert_eq!(metadata.site_name.chars().count(), SITE_NAME_MAX_CHARS);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let value = "é".repeat(5);
        assert_eq!(truncate_chars(&value, 3), "ééé");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_favicon_resolved_against_page_url() {
        let html = document(&[
            r#"<link rel="stylesheet" href="/style.css">"#,
            r#"<link rel="shortcut icon" href="/static/favicon.ico">"#,
        ]);
        let metadata = extract_metadata(&html, &identity());
        assert_eq!(
            metadata.favicon.as_deref(),
            Some("https://example.com/static/favicon.ico")
        );
    }

    #[test]
    fn test_favicon_ignores_non_http_references() {
        let html = document(&[
            r#"<link rel="icon" href="data:image/png;base64,AAAA">"#,
            r#"<link rel="apple-touch-icon" href="https://cdn.example.com/touch.png">"#,
        ]);
        let metadata = extract_metadata(&html, &identity());
        assert_eq!(
            metadata.favicon.as_deref(),
            Some("https://cdn.example.com/touch.png")
        );
    }

    #[test]
    fn test_malformed_html_does_not_fail() {
        let html = r#"<html><head><meta property="og:title" content="Broken"<title>Oops"#;
        let metadata = extract_metadata(html, &identity());
        assert!(!metadata.title.is_empty());
    }
}
