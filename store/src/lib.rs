//! Abstract cache storage trait for txtrail.
//!
//! Every storage backend (LMDB, the in-memory nullable for testing)
//! implements [`TxCacheStore`]. The rest of the codebase depends only on the
//! trait.

pub mod error;

pub use error::StoreError;

use txtrail_types::{Transaction, TxId};

/// Durable key→value cache of enriched transactions, keyed by transaction id.
///
/// The cache is append-only for the lifetime of the service: an existing key
/// is ground truth and callers never re-fetch it. Deletion and expiry are out
/// of scope.
pub trait TxCacheStore: Send + Sync {
    /// Idempotent setup of the named container records live in. Called once
    /// at startup; failure here is startup-fatal for the process.
    fn ensure_container(&self) -> Result<(), StoreError>;

    /// Look up a cached record. Pure local read, never network I/O.
    /// `Ok(None)` is a cache miss, not an error; a record that fails to
    /// decode is also reported as a miss so the caller falls back to
    /// re-fetching it.
    fn lookup(&self, id: &TxId) -> Result<Option<Transaction>, StoreError>;

    /// Persist a record under its transaction id, overwriting any prior
    /// value. The write is atomic per key: a failure must not corrupt
    /// previously committed records.
    fn put(&self, tx: &Transaction) -> Result<(), StoreError>;
}
