//! # Metadata Error Types Module
//!
//! Error types for the link-metadata pipeline. Only `MetadataError::InvalidUrl`
//! ever reaches a caller of the resolver; every `FetchError` is recovered
//! locally by synthesizing a preview from the URL structure.
//!
//! ## Key Components
//!
//! - `MetadataError`: Terminal failures for a single URL
//! - `FetchError`: Transport and status failures of the remote fetch

use thiserror::Error;

/// Errors surfaced by the metadata pipeline for a single URL
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The input cannot be parsed as a fetchable URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The raw input string
        url: String,
        /// Why the input was rejected
        reason: String,
    },

    /// The remote fetch failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors raised while retrieving a remote document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection, TLS, redirect or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a status outside the 2xx range
    #[error("HTTP status {status_code}")]
    Status {
        /// HTTP status code returned by the server
        status_code: u16,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status_code: status.as_u16(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
