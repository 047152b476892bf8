//! # Resolver Configuration Module
//!
//! Configuration for the metadata resolver: fetch behaviour (timeout,
//! browser-like headers, redirect and body limits), cache sizing and batch
//! fan-out. Uses the builder pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `ResolverConfig`: The configuration struct
//! - `ResolverConfigBuilder`: Builder pattern implementation for easier configuration

use std::time::Duration;

/// Desktop browser signature sent with every fetch
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default `Accept` header
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Default `Accept-Language` header
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Configuration for the resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Total time allowed for one fetch, body included
    pub timeout: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// Value of the `Accept` header
    pub accept: String,

    /// Value of the `Accept-Language` header
    pub accept_language: String,

    /// Maximum number of redirects followed per fetch
    pub max_redirects: usize,

    /// Bytes of response body read before parsing; the rest is discarded
    pub max_body_bytes: usize,

    /// Maximum number of cached records, `None` for unbounded
    pub cache_capacity: Option<usize>,

    /// Lifetime of a cached record, `None` for the process lifetime
    pub cache_ttl: Option<Duration>,

    /// Maximum number of fetches in flight during a batch resolution
    pub max_concurrency: usize,

    /// Pixel size requested from the favicon service
    pub favicon_size: u32,

    /// Fill a missing description with `Visit {domain}{path}`
    pub synthesize_description: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_redirects: 10,
            max_body_bytes: 2 * 1024 * 1024,
            cache_capacity: Some(10_000),
            cache_ttl: None,
            max_concurrency: 16,
            favicon_size: 32,
            synthesize_description: true,
        }
    }
}

/// Builder for ResolverConfig
#[derive(Debug, Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Set the fetch timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the `Accept` header value
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.config.accept = accept.into();
        self
    }

    /// Set the `Accept-Language` header value
    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.config.accept_language = accept_language.into();
        self
    }

    /// Set the maximum number of redirects to follow
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.max_redirects = max_redirects;
        self
    }

    /// Set the maximum number of body bytes to read
    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.config.max_body_bytes = max_body_bytes;
        self
    }

    /// Set the cache capacity, `None` for unbounded
    pub fn cache_capacity(mut self, cache_capacity: Option<usize>) -> Self {
        self.config.cache_capacity = cache_capacity;
        self
    }

    /// Set the cache entry lifetime, `None` for no expiry
    pub fn cache_ttl(mut self, cache_ttl: Option<Duration>) -> Self {
        self.config.cache_ttl = cache_ttl;
        self
    }

    /// Set the batch concurrency limit
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the favicon service size parameter
    pub fn favicon_size(mut self, favicon_size: u32) -> Self {
        self.config.favicon_size = favicon_size;
        self
    }

    /// Set whether a missing description is synthesized from the URL
    pub fn synthesize_description(mut self, synthesize_description: bool) -> Self {
        self.config.synthesize_description = synthesize_description;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

impl ResolverConfig {
    /// Create a new builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }

    /// Batch concurrency, never below one
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
