//! Fetching pages from their origin
//!
//! The downloader only needs a blocking `fetch(url)`. [`HttpFetcher`] is the
//! production implementation; tests substitute their own [`Fetcher`].

use crate::config::schema::HttpConfig;
use crate::error::{PageCacheError, PageCacheResult};
use std::time::Duration;
use tracing::debug;

/// Raw response from an origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking fetch of a URL.
///
/// Non-2xx statuses are returned as a response, not an error; transport
/// failures are returned as [`PageCacheError::Transport`]. Implementations
/// must not retry.
pub trait Fetcher: Send + Sync {
    /// Fetch `url`
    fn fetch(&self, url: &str) -> PageCacheResult<FetchResponse>;
}

/// HTTP(S) fetcher backed by a pooled `ureq` agent
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
    max_body_bytes: u64,
}

impl HttpFetcher {
    /// Build a fetcher from HTTP settings
    pub fn new(config: &HttpConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            user_agent: config.user_agent.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> PageCacheResult<FetchResponse> {
        debug!("GET {}", url);

        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| PageCacheError::transport(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_vec()
            .map_err(|e| PageCacheError::transport(url, e))?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(FetchResponse { status, body })
    }
}
