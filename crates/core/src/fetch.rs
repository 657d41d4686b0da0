//! Document retrieval over HTTP.
//!
//! A [`Fetcher`] owns one pooled `reqwest` client and applies the same
//! limits to every request: a total time budget, a redirect hop limit and a
//! body size cap. Failures are returned as [`FetchError`] and are never
//! retried here.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_LENGTH, USER_AGENT};
use reqwest::{Client, redirect};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{FetchError, Result, SignalError};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total request timeout in seconds, body transfer included.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Maximum number of redirects followed before giving up.
    pub max_redirects: usize,
    /// Maximum accepted body size in bytes.
    pub max_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; sgnl/0.1; +https://github.com/stormlightlabs/sgnl)".to_string(),
            max_redirects: 10,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// A successfully retrieved document.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub html: String,
}

/// Shared HTTP fetcher. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::HttpClient`] if the TLS backend cannot be initialised.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| SignalError::HttpClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches `url` and returns its body decoded as UTF-8 (lossy).
    pub async fn fetch(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        let parsed = validate_url(url)?;
        let timeout = self.config.timeout;
        let limit = self.config.max_bytes;

        let mut response = self
            .client
            .get(parsed)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }

        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > limit) {
            return Err(FetchError::TooLarge { limit });
        }

        let final_url = response.url().to_string();
        let mut body: Vec<u8> = Vec::with_capacity(declared.unwrap_or(0).min(limit));
        while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::from_reqwest(e, timeout))? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %final_url, status = status.as_u16(), bytes = body.len(), "fetched document");

        Ok(FetchedPage { url: final_url, status: status.as_u16(), html: String::from_utf8_lossy(&body).into_owned() })
    }
}

/// Parses `url` and checks that it is an absolute http(s) URL.
pub fn validate_url(url: &str) -> std::result::Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme '{other}' in {url}"))),
    }
}
