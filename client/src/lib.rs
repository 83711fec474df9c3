//! Ledger data source client for txtrail.
//!
//! [`LedgerClient`] is the capability interface the pipeline depends on;
//! [`HttpLedgerClient`] implements it against a blockchain.info-compatible
//! HTTP API. The client owns no state beyond its connection pool.

pub mod error;
pub mod http;

pub use error::ClientError;
pub use http::HttpLedgerClient;

use async_trait::async_trait;
use txtrail_types::{Address, BlockInfo, TxId, TxSummary};

/// Read capabilities of the external ledger.
///
/// Network-backed, no retry built in. Callers must not hold locks across
/// these calls.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// All transactions the ledger associates with `address`, in the order
    /// the ledger returns them. No ordering guarantee is imposed.
    async fn transactions_for_address(
        &self,
        address: &Address,
    ) -> Result<Vec<TxSummary>, ClientError>;

    /// The serialized body of one transaction.
    async fn raw_transaction(&self, id: &TxId) -> Result<String, ClientError>;

    /// The block(s) the ledger reports at `height`. More than one candidate
    /// means the ledger has seen a fork at that height.
    async fn blocks_at_height(&self, height: u64) -> Result<Vec<BlockInfo>, ClientError>;
}
