//! Partial-failure taxonomy of the enrichment pass.
//!
//! None of these abort the batch: each is collected alongside whatever did
//! succeed and reported to the caller.

use thiserror::Error;
use txtrail_client::ClientError;
use txtrail_store::StoreError;
use txtrail_types::TxId;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("raw body fetch failed for {id}: {source}")]
    RawFetch { id: TxId, source: ClientError },

    #[error("block lookup failed at height {height}: {source}")]
    HeightLookup { height: u64, source: ClientError },

    #[error("ledger reports {candidates} candidate blocks at height {height}")]
    ForkAmbiguity { height: u64, candidates: usize },

    #[error("no block found at height {height}")]
    NoMatchingBlock { height: u64 },

    #[error("failed to persist {id}: {source}")]
    Persist { id: TxId, source: StoreError },

    #[error("deadline exceeded while {stage}")]
    Deadline { stage: String },
}
