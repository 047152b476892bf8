//! Error responses for the HTTP API

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::metadata::MetadataError;

/// Errors returned to API clients as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// The `url` query parameter is missing or empty
    #[error("URL is required")]
    MissingUrl,

    /// The `url` parameter is not a fetchable URL
    #[error("Invalid URL format")]
    InvalidUrl,

    /// Too many URLs in a batch request
    #[error("At most {max} URLs can be resolved per request")]
    TooManyUrls {
        /// The per-request limit
        max: usize,
    },

    /// Unexpected resolver failure
    #[error("Failed to fetch metadata")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl | ApiError::TooManyUrls { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::InvalidUrl { .. } => ApiError::InvalidUrl,
            MetadataError::Fetch(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
