//! Structured data returned by the ledger client.

use crate::TxId;
use serde::{Deserialize, Serialize};

/// One entry of the ledger's transaction listing for an address.
///
/// `block_height == 0` is the source ledger's convention for "unconfirmed";
/// [`TxSummary::is_confirmed`] is the only place that convention is decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSummary {
    pub id: TxId,
    pub block_height: u64,
    pub time: u64,
}

impl TxSummary {
    pub fn is_confirmed(&self) -> bool {
        self.block_height != 0
    }
}

/// One candidate block reported by the ledger at a given height.
///
/// The ledger may report several candidates for the same height when it has
/// seen a fork; picking among them is the enrichment orchestrator's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub hash: String,
    pub height: u64,
}
