//! Trait definition for paginated search backends.
//!
//! The aggregator asks a backend for one page at a time and owns all
//! pagination and deduplication logic itself, so a backend only has to
//! translate `(query, page)` into a list of [`SearchResult`] values.

use crate::error::SearchError;
use crate::types::SearchResult;

/// A paginated search backend.
///
/// All implementations must be `Send + Sync` so that a single backend can be
/// shared by concurrent callers.
pub trait SearchBackend: Send + Sync {
    /// Fetch one page of results. `page` is 1-based.
    ///
    /// An empty vector means the backend has no more results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Backend`] if the request fails, the status is
    /// not 200, or the response cannot be parsed.
    fn fetch_page(
        &self,
        query: &str,
        page: u32,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend serving a fixed list of pages.
    struct FixedPages {
        pages: Vec<Vec<SearchResult>>,
    }

    impl SearchBackend for FixedPages {
        async fn fetch_page(
            &self,
            _query: &str,
            page: u32,
        ) -> Result<Vec<SearchResult>, SearchError> {
            let index = page.checked_sub(1).ok_or_else(|| {
                SearchError::Backend("pages are 1-based".into())
            })?;
            Ok(self
                .pages
                .get(index as usize)
                .cloned()
                .unwrap_or_default())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn backend_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FixedPages>();
    }

    #[tokio::test]
    async fn pages_are_one_based() {
        let backend = FixedPages {
            pages: vec![vec![SearchResult::new("A", "https://a.com", "a")]],
        };
        let first = backend.fetch_page("q", 1).await.expect("page 1");
        assert_eq!(first.len(), 1);
        assert!(backend.fetch_page("q", 0).await.is_err());
        assert!(backend.fetch_page("q", 2).await.expect("page 2").is_empty());
    }
}
