//! Core types for search results and their enriched form.

use serde::{Deserialize, Serialize};

/// A single result returned by the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result. Unique within one aggregated result set.
    pub url: String,
    /// The backend's text snippet for the page.
    pub snippet: String,
    /// Upstream engines that reported this result, when the backend says.
    #[serde(default)]
    pub engines: Vec<String>,
    /// Backend relevance score, passed through untouched.
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    /// Build a result with no engine attribution and a zero score.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            engines: Vec::new(),
            score: 0.0,
        }
    }
}

/// A search result with an optional page summary.
///
/// A missing `summary` means enrichment was disabled, skipped, or failed for
/// this item. That is a degraded success, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(default)]
    pub engines: Vec<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl EnrichedResult {
    /// Attach a summary to a copy of `result`.
    pub fn with_summary(result: &SearchResult, summary: Option<String>) -> Self {
        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            snippet: result.snippet.clone(),
            engines: result.engines.clone(),
            score: result.score,
            summary,
        }
    }
}

impl From<&SearchResult> for EnrichedResult {
    fn from(result: &SearchResult) -> Self {
        Self::with_summary(result, None)
    }
}

impl From<SearchResult> for EnrichedResult {
    fn from(result: SearchResult) -> Self {
        Self {
            title: result.title,
            url: result.url,
            snippet: result.snippet,
            engines: result.engines,
            score: result.score,
            summary: None,
        }
    }
}
