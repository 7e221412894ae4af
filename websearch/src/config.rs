//! Search, enrichment, and summariser configuration with sensible defaults.
//!
//! [`SearchConfig`] controls how the search backend is paginated,
//! [`EnrichConfig`] bounds the per-result fetch/summarise fan-out, and
//! [`SummarizerConfig`] points at an OpenAI-compatible completion backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use url::Url;

use crate::error::SearchError;

/// Client identifier sent on every search and page request.
pub const DEFAULT_USER_AGENT: &str = "websearch-mcp/1.0";

/// Configuration for querying the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the SearxNG instance, e.g. `http://localhost:8888`.
    pub base_url: String,
    /// Per-page HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Upper bound on page requests for one aggregation.
    ///
    /// Stops pagination against a backend that keeps returning only
    /// duplicates.
    pub max_pages: u32,
    /// User-Agent sent to the backend.
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_seconds: 10,
            max_pages: 50,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl SearchConfig {
    /// Create a config for the backend at `base_url` with default limits.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Per-page request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `base_url` is a non-empty absolute http(s) URL
    /// - `timeout_seconds` is greater than 0
    /// - `max_pages` is greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.base_url.trim().is_empty() {
            return Err(SearchError::Config("base_url must not be empty".into()));
        }
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::Config(format!(
                "base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_pages == 0 {
            return Err(SearchError::Config(
                "max_pages must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the fetch + summarise fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Maximum number of fetch/summarise tasks running at once.
    pub concurrency: usize,
    /// Hard deadline for fetching one page, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Hard deadline for one summarisation call, in seconds.
    pub summary_timeout_seconds: u64,
    /// Page text is truncated to this many bytes before summarisation.
    pub max_content_chars: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            fetch_timeout_ms: 5_000,
            summary_timeout_seconds: 30,
            max_content_chars: 100_000,
        }
    }
}

impl EnrichConfig {
    /// Fetch deadline as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Summarisation deadline as a [`Duration`].
    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_seconds)
    }

    /// Validates this configuration; every field must be non-zero and
    /// `concurrency` must fit in a [`Semaphore`].
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.concurrency == 0 {
            return Err(SearchError::Config(
                "concurrency must be greater than 0".into(),
            ));
        }
        if self.concurrency > Semaphore::MAX_PERMITS {
            return Err(SearchError::Config(format!(
                "concurrency must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(SearchError::Config(
                "fetch_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.summary_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "summary_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_content_chars == 0 {
            return Err(SearchError::Config(
                "max_content_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Connection details for an OpenAI-compatible chat completion backend.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Base URL including the version prefix, e.g. `https://openrouter.ai/api/v1`.
    pub base_url: String,
    /// Bearer token. Empty means no `Authorization` header.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("model", &self.model)
            .finish()
    }
}

impl SummarizerConfig {
    /// Create a config for `model` served at `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: String::new(),
            model: model.into(),
        }
    }

    /// Set the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Endpoint for chat completions.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_search_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.user_agent, "websearch-mcp/1.0");
    }

    #[test]
    fn valid_search_config_passes_validation() {
        let config = SearchConfig::new("http://localhost:8888");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_base_url_rejected() {
        let err = SearchConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn non_http_base_url_rejected() {
        let err = SearchConfig::new("ftp://example.com").validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn unparseable_base_url_rejected() {
        let err = SearchConfig::new("not a url").validate().unwrap_err();
        assert!(err.to_string().contains("invalid base_url"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..SearchConfig::new("http://localhost:8888")
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_max_pages_rejected() {
        let config = SearchConfig {
            max_pages: 0,
            ..SearchConfig::new("http://localhost:8888")
        };
        assert!(config.validate().unwrap_err().to_string().contains("max_pages"));
    }

    #[test]
    fn default_enrich_config_matches_observed_behaviour() {
        let config = EnrichConfig::default();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.summary_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = EnrichConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("concurrency"));
    }

    #[test]
    fn concurrency_above_semaphore_limit_rejected() {
        let config = EnrichConfig {
            concurrency: Semaphore::MAX_PERMITS + 1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"));

        let config = EnrichConfig {
            concurrency: Semaphore::MAX_PERMITS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_fetch_timeout_rejected() {
        let config = EnrichConfig {
            fetch_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: EnrichConfig = serde_json::from_str(r#"{"concurrency": 2}"#).expect("parse");
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.fetch_timeout_ms, 5_000);
    }

    #[test]
    fn completions_url_strips_trailing_slash() {
        let config = SummarizerConfig::new("https://openrouter.ai/api/v1/", "m");
        assert_eq!(
            config.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn summarizer_debug_redacts_api_key() {
        let config = SummarizerConfig::new("http://x/v1", "m").with_api_key("sk-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
