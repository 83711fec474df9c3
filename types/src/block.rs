//! Minimal block metadata attached to a confirmed transaction.

use serde::{Deserialize, Serialize};

/// Block metadata for a confirmed transaction.
///
/// `height` and `time` are set when the block is created from the ledger's
/// address listing and never mutated afterwards. `hash` starts out absent
/// and is filled in by the enrichment pass once the block at `height` has
/// been resolved; it may stay absent when no matching block was found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: Option<String>,
    pub height: u64,
    pub time: u64,
}

impl Block {
    /// Create block metadata for a confirmed transaction, hash not yet known.
    pub fn at_height(height: u64, time: u64) -> Self {
        Self {
            hash: None,
            height,
            time,
        }
    }

    /// Whether the enrichment pass has resolved this block's hash.
    pub fn is_resolved(&self) -> bool {
        self.hash.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_has_no_hash() {
        let block = Block::at_height(100, 1_600_000_000);
        assert_eq!(block.height, 100);
        assert_eq!(block.time, 1_600_000_000);
        assert!(!block.is_resolved());
    }
}
