//! # Metadata Cache Module
//!
//! Process-wide map from the exact input URL string to its resolved
//! [`LinkMetadata`]. Keys are compared byte for byte; no normalisation
//! happens here, so `https://a.com` and `https://a.com/` are distinct entries.
//!
//! ## Features
//!
//! - Least-recently-used eviction once the configured capacity is reached
//!   (unbounded when no capacity is configured)
//! - Optional time-to-live, expired entries are dropped on lookup
//! - Explicit invalidation of single entries or the whole cache
//! - Safe for concurrent use; the lock is never held across an await point

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::trace;

use crate::metadata::LinkMetadata;

#[derive(Debug, Clone)]
struct CacheEntry {
    metadata: LinkMetadata,
    inserted_at: Instant,
}

/// Cache of resolved link metadata keyed by URL string
#[derive(Debug)]
pub struct MetadataCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl MetadataCache {
    /// Create a cache
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of entries; `None` or zero for unbounded
    /// * `ttl` - Entry lifetime; `None` keeps entries until evicted
    pub fn new(capacity: Option<usize>, ttl: Option<Duration>) -> Self {
        let entries = match capacity.and_then(NonZeroUsize::new) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };

        Self {
            entries: Mutex::new(entries),
            ttl,
        }
    }

    /// Create a cache that never evicts
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the record for `url`
    pub fn get(&self, url: &str) -> Option<LinkMetadata> {
        let mut entries = self.lock();

        let expired = match entries.get(url) {
            None => return None,
            Some(entry) => self
                .ttl
                .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl),
        };

        if expired {
            trace!(url, "cache entry expired");
            entries.pop(url);
            return None;
        }

        entries.get(url).map(|entry| entry.metadata.clone())
    }

    /// Insert or overwrite the record for `url`
    pub fn put(&self, url: impl Into<String>, metadata: LinkMetadata) {
        let entry = CacheEntry {
            metadata,
            inserted_at: Instant::now(),
        };

        if let Some((evicted, _)) = self.lock().push(url.into(), entry) {
            trace!(url = %evicted, "cache entry replaced or evicted");
        }
    }

    /// Remove the record for `url`, returning it if present
    pub fn invalidate(&self, url: &str) -> Option<LinkMetadata> {
        self.lock().pop(url).map(|entry| entry.metadata)
    }

    /// Remove every record
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no records
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn metadata(url: &str, title: &str) -> LinkMetadata {
        LinkMetadata {
            url: url.to_string(),
            title: title.to_string(),
            description: None,
            site_name: "example.com".to_string(),
            favicon: "https://www.google.com/s2/favicons?domain=example.com&sz=32".to_string(),
            domain: "example.com".to_string(),
        }
    }

    #[test]
    fn test_get_and_put() {
        let cache = MetadataCache::unbounded();
        assert_eq!(cache.get("https://example.com"), None);

        cache.put("https://example.com", metadata("https://example.com", "Example"));
        let cached = cache.get("https://example.com").unwrap();
        assert_eq!(cached.title, "Example");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_exact_strings() {
        let cache = MetadataCache::unbounded();
        cache.put("https://example.com", metadata("https://example.com", "Example"));

        assert!(cache.get("https://example.com/").is_none());
        assert!(cache.get("HTTPS://example.com").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = MetadataCache::unbounded();
        cache.put("https://example.com", metadata("https://example.com", "First"));
        cache.put("https://example.com", metadata("https://example.com", "Second"));

        assert_eq!(cache.get("https://example.com").unwrap().title, "Second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = MetadataCache::new(Some(2), None);
        cache.put("https://a.com", metadata("https://a.com", "A"));
        cache.put("https://b.com", metadata("https://b.com", "B"));

        // Touch a so b becomes least recently used
        assert!(cache.get("https://a.com").is_some());
        cache.put("https://c.com", metadata("https://c.com", "C"));

        assert!(cache.get("https://a.com").is_some());
        assert!(cache.get("https://b.com").is_none());
        assert!(cache.get("https://c.com").is_some());
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let cache = MetadataCache::new(Some(0), None);
        for i in 0..50 {
            let url = format!("https://example.com/{}", i);
            cache.put(url.clone(), metadata(&url, "Page"));
        }
        assert_eq!(cache.len(), 50);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = MetadataCache::new(None, Some(Duration::ZERO));
        cache.put("https://example.com", metadata("https://example.com", "Example"));

        assert!(cache.get("https://example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = MetadataCache::unbounded();
        cache.put("https://a.com", metadata("https://a.com", "A"));
        cache.put("https://b.com", metadata("https://b.com", "B"));

        assert_eq!(cache.invalidate("https://a.com").unwrap().title, "A");
        assert!(cache.get("https://a.com").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_writes_to_different_keys() {
        let cache = Arc::new(MetadataCache::unbounded());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let url = format!("https://example.com/{}/{}", i, j);
                        cache.put(url.clone(), metadata(&url, "Page"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 800);
    }
}
