//! Error types for the urllist crate

use thiserror::Error;

use crate::metadata::MetadataError;

/// Result type for urllist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for urllist operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Link metadata could not be resolved
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Socket or filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}
