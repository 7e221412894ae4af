//! Search orchestration: paginated aggregation and result enrichment.
//!
//! [`aggregate`](aggregate::aggregate) walks the backend's pages until enough
//! unique results are collected. [`EnrichmentPipeline`](enrich::EnrichmentPipeline)
//! then fans out page fetches and summaries over those results.

pub mod aggregate;
pub mod enrich;
