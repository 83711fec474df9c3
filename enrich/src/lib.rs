//! Enrichment orchestrator for txtrail.
//!
//! Turns a batch of cache-miss transactions into fully merged, persisted
//! records: fetches raw bodies, partitions confirmed transactions by block
//! height, resolves each distinct height concurrently (bounded fan-out,
//! per-request deadline), merges block hashes back in and writes the merged
//! records to the cache store.

pub mod enricher;
pub mod error;

pub use enricher::{EnrichConfig, EnrichOutcome, Enricher, ForkPolicy};
pub use error::EnrichError;
