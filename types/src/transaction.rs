//! The cached transaction record.

use crate::{Block, TxId, TxSummary};
use serde::{Deserialize, Serialize};

/// One ledger transaction as txtrail caches and serves it.
///
/// The id stays attached to the record through the whole pipeline — it is
/// the cache key during persistence, never re-derived from the raw body.
/// `raw` is immutable once set; `block` is `None` for unconfirmed
/// transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub raw: String,
    pub block: Option<Block>,
}

impl Transaction {
    /// Build a transaction from a ledger listing entry and its fetched raw
    /// body. Confirmed entries get block metadata at the listed height with
    /// the hash left unresolved; unconfirmed entries carry no block at all.
    pub fn from_summary(summary: &TxSummary, raw: String) -> Self {
        let block = summary
            .is_confirmed()
            .then(|| Block::at_height(summary.block_height, summary.time));
        Self {
            id: summary.id.clone(),
            raw,
            block,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.block.is_some()
    }

    /// Whether the record carries a resolved block hash.
    pub fn is_enriched(&self) -> bool {
        self.block.as_ref().is_some_and(Block::is_resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, height: u64, time: u64) -> TxSummary {
        TxSummary {
            id: TxId::from(id),
            block_height: height,
            time,
        }
    }

    #[test]
    fn unconfirmed_summary_yields_no_block() {
        let tx = Transaction::from_summary(&summary("tx1", 0, 1_600_000_000), "raw1".into());
        assert!(tx.block.is_none());
        assert!(!tx.is_confirmed());
        assert!(!tx.is_enriched());
    }

    #[test]
    fn confirmed_summary_carries_listed_height() {
        let tx = Transaction::from_summary(&summary("tx2", 100, 1_600_000_000), "raw2".into());
        let block = tx.block.as_ref().expect("confirmed");
        assert_eq!(block.height, 100);
        assert_eq!(block.time, 1_600_000_000);
        assert!(block.hash.is_none());
        assert!(!tx.is_enriched());
    }
}
