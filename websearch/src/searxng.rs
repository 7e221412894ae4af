//! SearxNG JSON API backend.
//!
//! Issues `GET {base}/search?q=…&format=json&pageno=N` and maps the
//! `results` array onto [`SearchResult`]. The instance must have the JSON
//! output format enabled.

use serde::Deserialize;
use url::Url;

use crate::backend::SearchBackend;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::SearchResult;

/// SearxNG backend bound to one instance.
#[derive(Debug, Clone)]
pub struct SearxngBackend {
    config: SearchConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    engines: Vec<String>,
    #[serde(default)]
    score: f64,
}

impl From<SearxngResult> for SearchResult {
    fn from(raw: SearxngResult) -> Self {
        Self {
            title: raw.title,
            url: raw.url,
            snippet: raw.content,
            engines: raw.engines,
            score: raw.score,
        }
    }
}

impl SearxngBackend {
    /// Create a backend for the instance described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the config is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(&config.user_agent).map_err(SearchError::Config)?;
        Ok(Self { config, client })
    }

    /// The configuration this backend was built with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Build the URL for one result page.
    pub fn page_url(&self, query: &str, page: u32) -> Result<Url, SearchError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        url.set_path("/search");
        url.query_pairs_mut()
            .clear()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("pageno", &page.to_string());
        Ok(url)
    }
}

impl SearchBackend for SearxngBackend {
    async fn fetch_page(&self, query: &str, page: u32) -> Result<Vec<SearchResult>, SearchError> {
        let url = self.page_url(query, page)?;
        tracing::trace!(query, page, "SearxNG page request");

        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout())
            .send()
            .await
            .map_err(|e| SearchError::Backend(format!("request failed: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SearchError::Backend(format!(
                "unexpected status code: {}",
                status.as_u16()
            )));
        }

        let body: SearxngResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Backend(format!("failed to parse response: {e}")))?;

        tracing::trace!(page, count = body.results.len(), "SearxNG page received");
        Ok(body.results.into_iter().map(SearchResult::from).collect())
    }

    fn name(&self) -> &'static str {
        "searxng"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> SearxngBackend {
        SearxngBackend::new(SearchConfig::new(base)).expect("backend")
    }

    #[test]
    fn page_url_has_expected_parameters() {
        let url = backend("http://localhost:8888")
            .page_url("rust ownership", 3)
            .expect("url");
        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".into(), "rust ownership".into()),
                ("format".into(), "json".into()),
                ("pageno".into(), "3".into()),
            ]
        );
    }

    #[test]
    fn page_url_replaces_base_path_and_query() {
        let url = backend("https://search.example.com/some/path?x=1")
            .page_url("q", 1)
            .expect("url");
        assert_eq!(url.path(), "/search");
        assert!(!url.as_str().contains("x=1"));
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(SearxngBackend::new(SearchConfig::default()).is_err());
    }

    #[test]
    fn raw_result_maps_content_to_snippet() {
        let raw: SearxngResponse = serde_json::from_str(
            r#"{"results":[{"title":"T","url":"https://t.com","content":"c",
                "engines":["duckduckgo","brave"],"score":1.5,"category":"general"}]}"#,
        )
        .expect("parse");
        let results: Vec<SearchResult> = raw.results.into_iter().map(SearchResult::from).collect();
        assert_eq!(results[0].snippet, "c");
        assert_eq!(results[0].engines.len(), 2);
        assert!((results[0].score - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_results_field_is_empty_page() {
        let raw: SearxngResponse = serde_json::from_str(r#"{"query":"q"}"#).expect("parse");
        assert!(raw.results.is_empty());
    }
}
