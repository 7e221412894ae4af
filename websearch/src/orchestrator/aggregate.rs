//! Sequential, deduplicating pagination over a [`SearchBackend`].
//!
//! Pages are requested strictly one after another because whether the next
//! page is needed depends on how many new URLs the previous one produced.

use std::collections::HashSet;

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::types::SearchResult;

/// Upper bound on up-front buffer allocation; `limit` is caller-supplied.
const PREALLOCATE_MAX: usize = 64;

/// Collect up to `limit` results with unique URLs, paging through `backend`.
///
/// # Pipeline
///
/// 1. Request page 1, 2, 3, … (at most `max_pages` requests)
/// 2. Stop on an empty page: the backend has nothing more
/// 3. Skip results whose URL was already collected, keeping first-seen order
/// 4. Stop as soon as `limit` results are collected, even mid-page
///
/// # Errors
///
/// Returns [`SearchError::Backend`] only if a page fails before anything was
/// collected. A failure after that ends pagination and the partial results
/// are returned. Returns [`SearchError::Config`] if `limit` is zero.
pub async fn aggregate<B: SearchBackend>(
    backend: &B,
    query: &str,
    limit: usize,
    max_pages: u32,
) -> Result<Vec<SearchResult>, SearchError> {
    if limit == 0 {
        return Err(SearchError::Config("limit must be greater than 0".into()));
    }

    let capacity = limit.min(PREALLOCATE_MAX);
    let mut results: Vec<SearchResult> = Vec::with_capacity(capacity);
    let mut seen: HashSet<String> = HashSet::with_capacity(capacity);

    for page in 1..=max_pages {
        let page_results = match backend.fetch_page(query, page).await {
            Ok(page_results) => page_results,
            Err(err) if results.is_empty() => {
                tracing::warn!(backend = backend.name(), page, error = %err, "search failed");
                return Err(err);
            }
            Err(err) => {
                tracing::debug!(
                    backend = backend.name(),
                    page,
                    collected = results.len(),
                    error = %err,
                    "later page failed; returning partial results"
                );
                break;
            }
        };

        if page_results.is_empty() {
            tracing::debug!(page, "no more results");
            break;
        }

        for result in page_results {
            if results.len() >= limit {
                break;
            }
            if seen.insert(result.url.clone()) {
                results.push(result);
            }
        }

        if results.len() >= limit {
            break;
        }

        if page == max_pages {
            tracing::debug!(max_pages, collected = results.len(), "page cap reached");
        }
    }

    Ok(results)
}
