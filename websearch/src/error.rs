//! Error types for the websearch crate.
//!
//! Only [`SearchError`] and [`EnrichError::Cancelled`] ever reach a caller.
//! [`FetchError`] and [`SummarizeError`] are per-result failures that the
//! enrichment pipeline absorbs into a snippet-only result. No API keys or
//! page bodies appear in error messages.

/// Errors that fail a whole search call.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search backend failed on the first page request.
    #[error("search backend error: {0}")]
    Backend(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Failure to retrieve the text body of a single result page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The URL is unparseable or lacks a scheme or host.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport failure, body read failure, or the deadline expired.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The response status was outside 200–299.
    #[error("unexpected status code: {0}")]
    BadStatus(u16),

    /// The declared `Content-Type` is not text-like.
    #[error("unsupported content type: {0:?}")]
    UnsupportedContentType(String),
}

/// Failure to obtain a summary from the completion backend.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    /// The backend call failed or returned no choices.
    #[error("completion error: {0}")]
    Completion(String),

    /// The page had no text worth summarising.
    #[error("empty content: {0}")]
    EmptyContent(String),
}

/// Errors that abort an enrichment call before any task is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// The caller cancelled the call before dispatch.
    #[error("enrichment cancelled before dispatch")]
    Cancelled,
}

/// Convenience type alias for search results.
pub type Result<T> = std::result::Result<T, SearchError>;
