//! Resolution orchestrator
//!
//! The single entry point for turning URLs into [`LinkMetadata`]. Every
//! fallback decision lives here so that API handlers and other callers never
//! derive previews themselves.

use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, instrument, trace, warn};

use crate::error::Result;
use crate::metadata::cache::MetadataCache;
use crate::metadata::config::ResolverConfig;
use crate::metadata::error::MetadataError;
use crate::metadata::extraction::{ExtractedMetadata, extract_metadata};
use crate::metadata::fallback::{Fallback, synthesize};
use crate::metadata::fetcher::{Fetch, HttpFetcher};
use crate::metadata::url_identity::UrlIdentity;
use crate::metadata::{LinkMetadata, PendingUrlState};

/// Resolves URLs into link metadata, with caching and fallback synthesis
#[derive(Debug)]
pub struct Resolver<F = HttpFetcher> {
    fetcher: F,
    cache: MetadataCache,
    config: ResolverConfig,
}

impl Resolver<HttpFetcher> {
    /// Create a resolver that fetches over HTTP
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: Fetch> Resolver<F> {
    /// Create a resolver around any fetch capability
    pub fn with_fetcher(fetcher: F, config: ResolverConfig) -> Self {
        let cache = MetadataCache::new(config.cache_capacity, config.cache_ttl);
        Self {
            fetcher,
            cache,
            config,
        }
    }

    /// The cache backing this resolver
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// The fetch capability used on cache misses
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The resolver configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a single URL
    ///
    /// # Arguments
    ///
    /// * `url` - The URL exactly as stored in the collection; it is also the
    ///   cache key
    ///
    /// # Returns
    ///
    /// The resolved metadata. Fetch failures degrade to a preview synthesized
    /// from the URL; only an unparsable URL is an error.
    #[instrument(skip(self))]
    pub async fn resolve(&self, url: &str) -> std::result::Result<LinkMetadata, MetadataError> {
        let identity = UrlIdentity::parse(url)?;

        if let Some(cached) = self.cache.get(url) {
            trace!(cache_hit = true, "serving cached metadata");
            return Ok(cached);
        }

        let fallback = synthesize(&identity, self.config.favicon_size);
        let metadata = match self.fetcher.fetch(&identity.url).await {
            Ok(html) => {
                let extracted = extract_metadata(&html, &identity);
                self.merge(url, extracted, fallback)
            }
            Err(err) => {
                warn!(error = %err, "fetch failed, synthesizing preview from url");
                self.from_fallback(url, fallback)
            }
        };

        debug!(cache_hit = false, title = %metadata.title, "resolved metadata");
        self.cache.put(url, metadata.clone());
        Ok(metadata)
    }

    /// Resolve a batch of URLs concurrently
    ///
    /// Each URL is resolved independently; one failure never affects the
    /// others. Results are returned in input order.
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    pub async fn resolve_all<S>(&self, urls: &[S]) -> Vec<PendingUrlState>
    where
        S: AsRef<str> + Sync,
    {
        // Owned keys so the batch future stays Send
        let urls: Vec<String> = urls.iter().map(|url| url.as_ref().to_string()).collect();

        stream::iter(urls)
            .map(move |url| async move { self.resolve_pending(&url).await })
            .buffered(self.config.effective_concurrency())
            .collect()
            .await
    }

    /// Resolve a batch of URLs, yielding each state as soon as it settles
    ///
    /// Completion order is unspecified.
    pub fn resolve_unordered(
        &self,
        urls: Vec<String>,
    ) -> impl Stream<Item = PendingUrlState> + '_ {
        stream::iter(urls)
            .map(move |url| async move { self.resolve_pending(&url).await })
            .buffer_unordered(self.config.effective_concurrency())
    }

    async fn resolve_pending(&self, url: &str) -> PendingUrlState {
        let outcome = self.resolve(url).await;
        if let Err(err) = &outcome {
            debug!(url, error = %err, "url could not be resolved");
        }
        PendingUrlState::loading(url).settle(outcome)
    }

    fn merge(&self, url: &str, extracted: ExtractedMetadata, fallback: Fallback) -> LinkMetadata {
        let description = extracted.description.or_else(|| {
            self.config
                .synthesize_description
                .then_some(fallback.description)
        });

        LinkMetadata {
            url: url.to_string(),
            title: extracted.title,
            description,
            site_name: extracted.site_name,
            favicon: extracted.favicon.unwrap_or(fallback.favicon),
            domain: fallback.domain,
        }
    }

    fn from_fallback(&self, url: &str, fallback: Fallback) -> LinkMetadata {
        LinkMetadata {
            url: url.to_string(),
            title: fallback.title,
            description: self
                .config
                .synthesize_description
                .then_some(fallback.description),
            site_name: fallback.site_name,
            favicon: fallback.favicon,
            domain: fallback.domain,
        }
    }
}
