//! Page fetching under a hard deadline.
//!
//! [`PageFetcher`] downloads the body of a search result's URL, but only if
//! the response is a 2xx with a text-like `Content-Type`. The whole exchange,
//! body included, runs under the caller's timeout; when it expires the
//! in-flight request is dropped.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::DEFAULT_USER_AGENT;
use crate::content::is_text_like;
use crate::error::FetchError;
use crate::http;

/// A source of page bodies.
///
/// The enrichment pipeline only sees this trait, so tests can script
/// latency and failures without a network.
pub trait PageSource: Send + Sync + 'static {
    /// Fetch the text body at `url`, giving up after `timeout`.
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP implementation of [`PageSource`].
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Create a fetcher identifying itself as `websearch-mcp/1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RequestFailed`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        let client = http::build_client(DEFAULT_USER_AGENT).map_err(FetchError::RequestFailed)?;
        Ok(Self { client })
    }

    /// Use an existing client, e.g. one shared with the search backend.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_unbounded(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !is_text_like(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("failed to read response body: {e}")))
    }
}

impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        validate_url(url)?;
        tracing::trace!(url, "fetching page");

        match tokio::time::timeout(timeout, self.fetch_unbounded(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::RequestFailed(format!(
                "timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }
}

/// Reject URLs without a scheme or host before any network activity.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(raw).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => {
            FetchError::InvalidUrl(format!("URL missing scheme: {raw}"))
        }
        url::ParseError::EmptyHost => FetchError::InvalidUrl(format!("URL missing host: {raw}")),
        other => FetchError::InvalidUrl(format!("{raw}: {other}")),
    })?;

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(FetchError::InvalidUrl(format!("URL missing host: {raw}")));
    }
    Ok(parsed)
}
