//! Shared HTTP clients for the search backend, page fetches, and the
//! completion backend.
//!
//! Every client identifies itself with a fixed User-Agent. The completion
//! client is additionally decorated with attribution headers at construction
//! time, so no call site can forget or override them.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::DEFAULT_USER_AGENT;

/// Project URL reported to completion providers for traffic attribution.
pub const ATTRIBUTION_REFERER: &str = "https://github.com/benoute/websearch-mcp";

/// Application name reported to completion providers.
pub const ATTRIBUTION_TITLE: &str = "websearch-mcp";

/// Maximum redirects followed on any request.
const MAX_REDIRECTS: usize = 10;

/// Build a [`reqwest::Client`] for backend and page requests.
///
/// Timeouts are applied per request by the caller, not on the client.
///
/// # Errors
///
/// Returns the builder's error message if the client cannot be constructed.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))
}

/// Build the client used for chat completion calls.
///
/// The attribution headers become client defaults and ride along on every
/// outbound request.
///
/// # Errors
///
/// Returns the builder's error message if the client cannot be constructed.
pub fn build_completion_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .default_headers(attribution_headers())
        .build()
        .map_err(|e| format!("failed to build completion client: {e}"))
}

/// Fixed attribution headers for completion providers.
pub fn attribution_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("http-referer"),
        HeaderValue::from_static(ATTRIBUTION_REFERER),
    );
    headers.insert(
        HeaderName::from_static("x-title"),
        HeaderValue::from_static(ATTRIBUTION_TITLE),
    );
    headers
}
