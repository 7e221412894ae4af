//! # websearch
//!
//! Web search aggregation over a SearxNG instance, with optional
//! LLM summaries of every result page.
//!
//! ## Design
//!
//! - Pages through the backend's JSON API, deduplicating by URL, until the
//!   requested number of results is collected or the backend runs dry
//! - Fetches each result page under a hard deadline, accepting only
//!   text-like content types
//! - Summarises page text against the original query through any
//!   OpenAI-compatible chat completion API
//! - Runs fetch + summarise for a batch with bounded concurrency, keeping
//!   input order and degrading failed items to snippet-only results
//!
//! ## Non-goals
//!
//! No crawling, no caching across calls, no re-ranking of backend results.

pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod http;
pub mod orchestrator;
pub mod searxng;
pub mod summarizer;
pub mod types;

use std::time::Duration;

pub use backend::SearchBackend;
pub use config::{EnrichConfig, SearchConfig, SummarizerConfig};
pub use content::is_text_like;
pub use error::{EnrichError, FetchError, Result, SearchError, SummarizeError};
pub use fetch::{PageFetcher, PageSource};
pub use orchestrator::enrich::{EnrichmentPipeline, snippets_only};
pub use searxng::SearxngBackend;
pub use summarizer::{Summarize, Summarizer};
pub use types::{EnrichedResult, SearchResult};

/// Search the SearxNG instance in `config` for up to `limit` unique results.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid config or zero `limit`,
/// and [`SearchError::Backend`] if the first page request fails.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> websearch::Result<()> {
/// let config = websearch::SearchConfig::new("http://localhost:8888");
/// let results = websearch::aggregate("rust ownership", 10, &config).await?;
/// for result in &results {
///     println!("{}: {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn aggregate(
    query: &str,
    limit: usize,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>> {
    let backend = SearxngBackend::new(config.clone())?;
    orchestrator::aggregate::aggregate(&backend, query, limit, config.max_pages).await
}

/// Fetch the text body of `url`, giving up after `timeout`.
///
/// # Errors
///
/// See [`FetchError`] for the failure cases.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), websearch::FetchError> {
/// let timeout = std::time::Duration::from_secs(5);
/// let body = websearch::fetch_page("https://example.com", timeout).await?;
/// println!("{} bytes", body.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_page(url: &str, timeout: Duration) -> std::result::Result<String, FetchError> {
    PageFetcher::new()?.fetch(url, timeout).await
}
