//! The `search` tool operation shared by every host.
//!
//! Validates caller input, applies defaults, aggregates results from the
//! search backend, and optionally enriches them with page summaries.

use std::sync::Arc;
use std::time::Instant;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use websearch::orchestrator::aggregate::aggregate;
use websearch::{
    EnrichedResult, EnrichmentPipeline, PageFetcher, SearxngBackend, Summarizer, snippets_only,
};

use crate::config::HostConfig;
use crate::error::{HostError, ToolError};

/// Result count used when the caller gives none, zero, or a negative limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Target summary length used when the caller gives none or a non-positive one.
pub const DEFAULT_MAX_SUMMARY_TOKENS: u32 = 200;

/// Caller input for one search.
///
/// Field docs double as the tool schema descriptions clients see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchInput {
    /// The search query. Optionally add 'site:website.com' to search within
    /// a specific website.
    #[serde(default)]
    pub query: String,
    /// Maximum number of search results (default: 10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Summarise each result page with an LLM (default: false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<bool>,
    /// Target summary length in tokens (default: 200).
    #[serde(
        default,
        rename = "maxSummaryTokens",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_summary_tokens: Option<i64>,
}

impl SearchInput {
    /// Input for `query` with every option defaulted.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    fn effective_limit(&self) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => usize::try_from(limit).unwrap_or(usize::MAX),
            _ => DEFAULT_LIMIT,
        }
    }

    fn effective_max_summary_tokens(&self) -> u32 {
        match self.max_summary_tokens {
            Some(tokens) if tokens > 0 => u32::try_from(tokens).unwrap_or(u32::MAX),
            _ => DEFAULT_MAX_SUMMARY_TOKENS,
        }
    }
}

type Pipeline = EnrichmentPipeline<PageFetcher, Summarizer>;

fn config_err(e: impl std::fmt::Display) -> HostError {
    HostError::Config(e.to_string())
}

/// Runs search tool calls against one backend and optional summariser.
pub struct SearchService {
    backend: SearxngBackend,
    max_pages: u32,
    pipeline: Option<Pipeline>,
}

impl SearchService {
    /// Build the service from validated host configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] if the backend, fetcher, or summariser
    /// cannot be constructed.
    pub fn from_config(config: &HostConfig) -> crate::error::Result<Self> {
        let backend = SearxngBackend::new(config.search.clone()).map_err(config_err)?;

        let pipeline = match config.summarizer_config() {
            Some(summarizer_config) => {
                let model = summarizer_config.model.clone();
                let summarizer = Summarizer::new(summarizer_config).map_err(config_err)?;
                let fetcher = PageFetcher::new().map_err(config_err)?;
                let pipeline = EnrichmentPipeline::new(
                    Arc::new(fetcher),
                    Arc::new(summarizer),
                    config.enrich.clone(),
                )
                .map_err(config_err)?;
                tracing::info!(
                    model = %model,
                    concurrency = config.enrich.concurrency,
                    "page summaries enabled"
                );
                Some(pipeline)
            }
            None => {
                tracing::info!("no summarisation backend configured; summaries unavailable");
                None
            }
        };

        Ok(Self {
            backend,
            max_pages: config.search.max_pages,
            pipeline,
        })
    }

    /// Whether `summary: true` requests can be honoured.
    pub fn summaries_available(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Run one search to completion.
    ///
    /// # Errors
    ///
    /// See [`handle_until`](Self::handle_until).
    pub async fn handle(&self, input: SearchInput) -> Result<Vec<EnrichedResult>, ToolError> {
        self.handle_until(input, &CancellationToken::new()).await
    }

    /// Run one search, abandoning outstanding summaries when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Input`] for a blank query and
    /// [`ToolError::Search`] if the backend fails before producing results.
    pub async fn handle_until(
        &self,
        input: SearchInput,
        cancel: &CancellationToken,
    ) -> Result<Vec<EnrichedResult>, ToolError> {
        if input.query.trim().is_empty() {
            return Err(ToolError::Input("query is required".into()));
        }
        let limit = input.effective_limit();
        let max_summary_tokens = input.effective_max_summary_tokens();
        let summary = input.summary.unwrap_or(false);

        let search_started = Instant::now();
        let results = aggregate(&self.backend, &input.query, limit, self.max_pages).await;
        tracing::debug!(
            query = %input.query,
            results = results.as_ref().map_or(0, Vec::len),
            duration_ms = search_started.elapsed().as_millis() as u64,
            "search finished"
        );
        let results = results?;

        if !summary {
            return Ok(snippets_only(&results));
        }
        let Some(pipeline) = &self.pipeline else {
            tracing::warn!("summaries requested but no summarisation backend is configured");
            return Ok(snippets_only(&results));
        };

        let enrich_started = Instant::now();
        let enriched = match pipeline
            .enrich_until(&results, &input.query, true, max_summary_tokens, cancel)
            .await
        {
            Ok(enriched) => enriched,
            Err(e) => {
                tracing::debug!(error = %e, "enrichment skipped");
                snippets_only(&results)
            }
        };
        tracing::debug!(
            results = enriched.len(),
            summarized = enriched.iter().filter(|r| r.summary.is_some()).count(),
            duration_ms = enrich_started.elapsed().as_millis() as u64,
            "enrichment finished"
        );
        Ok(enriched)
    }
}
