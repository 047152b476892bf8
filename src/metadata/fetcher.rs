//! Remote document fetching
//!
//! This module provides the HTTP client used to retrieve the HTML behind a
//! link. Requests carry a desktop-browser signature, follow redirects, and are
//! bounded by a total timeout and a body size limit. No retries are made.

use std::future::Future;
use std::time::Instant;

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, DNT, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client as ReqwestClient, redirect};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Error, Result};
use crate::metadata::config::ResolverConfig;
use crate::metadata::error::FetchError;

/// Capability to retrieve the body of a remote document
pub trait Fetch: Send + Sync {
    /// Fetch the document at `url` and return its body as text
    fn fetch(
        &self,
        url: &Url,
    ) -> impl Future<Output = std::result::Result<String, FetchError>> + Send;
}

/// HTTP fetcher backed by reqwest
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Body bytes read before the rest of the response is dropped
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Create a fetcher from the resolver configuration
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("Accept", &config.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("Accept-Language", &config.accept_language)?,
        );
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("invalid {} header value: {}", name, e)))
}

impl Fetch for HttpFetcher {
    #[instrument(skip(self, url), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> std::result::Result<String, FetchError> {
        let started = Instant::now();
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status_code = status.as_u16(), "non-success response");
            return Err(FetchError::Status {
                status_code: status.as_u16(),
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let remaining = self.max_body_bytes.saturating_sub(body.len());
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                debug!(max_body_bytes = self.max_body_bytes, "body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        debug!(
            status_code = status.as_u16(),
            body_len = body.len(),
            final_url = %response.url(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched document"
        );

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
