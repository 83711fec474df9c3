//! Request/response types and the merge-trigger core.

use serde::{Deserialize, Serialize};

use txtrail_types::{Address, Block, Transaction};

use crate::server::AppState;
use crate::RpcError;

// ── Wire shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GetTransactionsRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct GetTransactionsResponse {
    pub transactions: Vec<TransactionView>,
    /// Partial-failure annotations (deadline, unresolved heights, failed
    /// writes). Empty means the batch enriched cleanly.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// One transaction as the API serves it: the raw body plus block metadata,
/// `block` null while unconfirmed.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub raw: String,
    pub block: Option<BlockView>,
}

#[derive(Debug, Serialize)]
pub struct BlockView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub height: u64,
    pub time: u64,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            raw: tx.raw,
            block: tx.block.map(BlockView::from),
        }
    }
}

impl From<Block> for BlockView {
    fn from(b: Block) -> Self {
        Self {
            hash: b.hash,
            height: b.height,
            time: b.time,
        }
    }
}

// ── Merge-trigger core ───────────────────────────────────────────────────

/// Assemble the full transaction list for an address.
///
/// Partitions the ledger's listing into cache hits (returned verbatim) and
/// misses, hands the complete miss set to the enricher in a single batch,
/// and responds hits first, then enriched misses — both halves in
/// ledger-listing order.
///
/// Failing to obtain the listing itself is the only request-fatal error;
/// everything downstream degrades to annotations in the response.
pub async fn assemble_transactions(
    state: &AppState,
    address: &Address,
) -> Result<GetTransactionsResponse, RpcError> {
    if address.is_empty() {
        return Err(RpcError::InvalidRequest("address must not be empty".into()));
    }

    let listing = state.client.transactions_for_address(address).await?;
    tracing::debug!(address = %address, listed = listing.len(), "ledger listing fetched");

    let mut hits = Vec::new();
    let mut misses = Vec::new();
    for summary in listing {
        match state.store.lookup(&summary.id)? {
            Some(tx) => hits.push(tx),
            None => misses.push(summary),
        }
    }

    let hit_count = hits.len();
    let outcome = state.enricher.enrich(misses).await;
    tracing::info!(
        address = %address,
        hits = hit_count,
        enriched = outcome.transactions.len(),
        failures = outcome.failures.len(),
        "request assembled"
    );

    let errors = outcome.failures.iter().map(|f| f.to_string()).collect();
    let transactions = hits
        .into_iter()
        .chain(outcome.transactions)
        .map(TransactionView::from)
        .collect();

    Ok(GetTransactionsResponse {
        transactions,
        errors,
    })
}
