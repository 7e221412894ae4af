//! Bounded-concurrency fetch + summarise fan-out.
//!
//! Every result gets its own task on a [`JoinSet`]. A [`Semaphore`] with
//! `concurrency` permits limits how many of them do network work at once;
//! the rest wait for a slot. Each task reports `(index, summary)` and the
//! coordinator writes the summary into a pre-sized output buffer at that
//! index, so output order is input order regardless of completion order.
//!
//! Per-item failures (fetch errors, unreadable pages, summariser errors,
//! timeouts, cancellation) leave that slot snippet-only and are logged at
//! warn level. They never fail the call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::EnrichConfig;
use crate::content::readable_text;
use crate::error::{EnrichError, FetchError, SearchError, SummarizeError};
use crate::fetch::PageSource;
use crate::summarizer::Summarize;
use crate::types::{EnrichedResult, SearchResult};

/// Why one result ended up without a summary.
#[derive(Debug, thiserror::Error)]
enum ItemFailure {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("summarize failed: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("{stage} timed out after {elapsed:?}")]
    Timeout {
        stage: &'static str,
        elapsed: Duration,
    },

    #[error("cancelled")]
    Cancelled,
}

/// State shared by every task of one enrichment call.
struct TaskContext<F, S> {
    fetcher: Arc<F>,
    summarizer: Arc<S>,
    semaphore: Semaphore,
    cancel: CancellationToken,
    query: String,
    max_tokens: u32,
    fetch_timeout: Duration,
    summary_timeout: Duration,
    max_content_chars: usize,
}

/// Project results to snippet-only enriched results. No network activity.
pub fn snippets_only(results: &[SearchResult]) -> Vec<EnrichedResult> {
    results.iter().map(EnrichedResult::from).collect()
}

/// Fans out page fetching and summarisation over a batch of results.
pub struct EnrichmentPipeline<F, S> {
    fetcher: Arc<F>,
    summarizer: Arc<S>,
    config: EnrichConfig,
}

impl<F: PageSource, S: Summarize> EnrichmentPipeline<F, S> {
    /// Create a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(
        fetcher: Arc<F>,
        summarizer: Arc<S>,
        config: EnrichConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            fetcher,
            summarizer,
            config,
        })
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// Enrich `results`, producing exactly one output per input, in order.
    ///
    /// With `summary_enabled == false` this is [`snippets_only`].
    pub async fn enrich(
        &self,
        results: &[SearchResult],
        query: &str,
        summary_enabled: bool,
        max_summary_tokens: u32,
    ) -> Vec<EnrichedResult> {
        let never = CancellationToken::new();
        self.enrich_until(results, query, summary_enabled, max_summary_tokens, &never)
            .await
            .unwrap_or_else(|_| snippets_only(results))
    }

    /// Like [`enrich`](Self::enrich), but observes `cancel`.
    ///
    /// Cancellation while tasks are running or waiting for a slot stops them
    /// promptly; their slots stay snippet-only and summaries that already
    /// finished are kept.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Cancelled`] if `cancel` fired before any task
    /// was dispatched.
    pub async fn enrich_until(
        &self,
        results: &[SearchResult],
        query: &str,
        summary_enabled: bool,
        max_summary_tokens: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<EnrichedResult>, EnrichError> {
        let mut output = snippets_only(results);
        if !summary_enabled || results.is_empty() {
            return Ok(output);
        }
        if cancel.is_cancelled() {
            return Err(EnrichError::Cancelled);
        }

        let started = Instant::now();
        let context = Arc::new(TaskContext {
            fetcher: Arc::clone(&self.fetcher),
            summarizer: Arc::clone(&self.summarizer),
            semaphore: Semaphore::new(self.config.concurrency),
            cancel: cancel.child_token(),
            query: query.to_owned(),
            max_tokens: max_summary_tokens.max(1),
            fetch_timeout: self.config.fetch_timeout(),
            summary_timeout: self.config.summary_timeout(),
            max_content_chars: self.config.max_content_chars,
        });

        // Dropping the set aborts every task, so nothing outlives this call.
        let mut tasks = JoinSet::new();
        for (index, result) in results.iter().enumerate() {
            tasks.spawn(enrich_one(Arc::clone(&context), index, result.url.clone()));
        }

        let mut enriched = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(summary))) => {
                    if let Some(slot) = output.get_mut(index) {
                        slot.summary = Some(summary);
                        enriched += 1;
                    }
                }
                Ok((_, None)) => {}
                Err(e) => tracing::error!(error = %e, "enrichment task aborted"),
            }
        }

        tracing::debug!(
            total = output.len(),
            enriched,
            degraded = output.len() - enriched,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enrichment finished"
        );
        Ok(output)
    }
}

/// Run one item to a terminal state: `Some(summary)` or a logged `None`.
async fn enrich_one<F: PageSource, S: Summarize>(
    context: Arc<TaskContext<F, S>>,
    index: usize,
    url: String,
) -> (usize, Option<String>) {
    let outcome = tokio::select! {
        biased;
        () = context.cancel.cancelled() => Err(ItemFailure::Cancelled),
        outcome = fetch_and_summarize(&context, &url) => outcome,
    };

    match outcome {
        Ok(summary) => (index, Some(summary)),
        Err(ItemFailure::Cancelled) => {
            tracing::debug!(index, url = %url, "enrichment cancelled; keeping snippet");
            (index, None)
        }
        Err(failure) => {
            tracing::warn!(
                index,
                url = %url,
                error = %failure,
                "enrichment failed; keeping snippet"
            );
            (index, None)
        }
    }
}

async fn fetch_and_summarize<F: PageSource, S: Summarize>(
    context: &TaskContext<F, S>,
    url: &str,
) -> Result<String, ItemFailure> {
    // The permit is held for both network steps.
    let _permit = context
        .semaphore
        .acquire()
        .await
        .map_err(|_| ItemFailure::Cancelled)?;

    let body = tokio::time::timeout(
        context.fetch_timeout,
        context.fetcher.fetch(url, context.fetch_timeout),
    )
    .await
    .map_err(|_| ItemFailure::Timeout {
        stage: "fetch",
        elapsed: context.fetch_timeout,
    })??;

    let content = readable_text(&body, context.max_content_chars)
        .ok_or_else(|| SummarizeError::EmptyContent(format!("no readable text at {url}")))?;

    let summary = tokio::time::timeout(
        context.summary_timeout,
        context
            .summarizer
            .summarize(&content, &context.query, url, context.max_tokens),
    )
    .await
    .map_err(|_| ItemFailure::Timeout {
        stage: "summarize",
        elapsed: context.summary_timeout,
    })??;

    Ok(summary)
}
