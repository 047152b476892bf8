//! # urllist - Link Metadata for URL List Collections
//!
//! URL List lets users bundle many links behind one short, shareable slug.
//! Every link in a collection is shown as a preview card, and this crate
//! produces the data behind those cards: it fetches each page, reads its Open
//! Graph / Twitter Card / generic meta tags, falls back to a preview derived
//! from the URL itself when the page is unreachable, and caches the result.
//!
//! ## Features
//!
//! - Tolerant HTML parsing with ordered candidate lists per field
//! - Browser-like fetching with a 15 second timeout and redirect following
//! - URL-derived fallback previews that never leave a card empty
//! - Bounded, URL-keyed LRU cache with optional expiry
//! - Concurrent batch resolution with per-URL failure isolation
//! - An axum HTTP API for front ends
//!
//! ## Example
//!
//! ```rust,no_run
//! use urllist::metadata::{Resolver, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::new(ResolverConfig::default())?;
//!
//!     let metadata = resolver.resolve("https://www.rust-lang.org").await?;
//!     println!("{} ({})", metadata.title, metadata.domain);
//!
//!     let states = resolver
//!         .resolve_all(&["https://crates.io", "not a url"])
//!         .await;
//!     for state in states {
//!         println!("{}: {:?}", state.url, state.title.or(state.error));
//!     }
//!     Ok(())
//! }
//! ```

mod error;

pub mod api;
pub mod metadata;

pub use error::{Error, Result};

/// Re-export of commonly used types
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::metadata::{LinkMetadata, PendingUrlState, Resolver, ResolverConfig};
}
