// src/mirror/fetch.rs
// =============================================================================
// This module downloads one URL.
//
// Key functionality:
// - The Fetcher trait is the seam between the crawler and the network, so the
//   crawl logic can be driven by an in-memory site in tests
// - HttpFetcher is the real implementation: one GET per URL with reqwest
// - Transport failures are sorted into FetchError variants (timeout,
//   connection, redirect loop, ...)
//
// A non-2xx response is NOT an error here: it comes back as a FetchResult and
// the crawl task decides what to do with the status.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

/// Follow up to this many redirects before giving up
const MAX_REDIRECTS: usize = 5;

/// What came back from the server. Dropped as soon as the page is processed.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single request-response fetch for a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError>;
}

/// reqwest-backed fetcher used by the binary.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Create an HTTP client with reasonable settings
    // We'll reuse this client for all requests (connection pooling)
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Body(e.to_string())
                }
            })?
            .to_vec();

        Ok(FetchResult {
            status,
            content_type,
            body,
        })
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure / connection refused
// - Too many redirects
// - etc.
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::Redirect
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Other(error.to_string())
    }
}
