//! Nullable ledger client — scripted responses, counted calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use txtrail_client::{ClientError, LedgerClient};
use txtrail_types::{Address, BlockInfo, TxId, TxSummary};

/// A test ledger client that serves scripted data and records every call.
///
/// Unscripted heights resolve to an empty block list (the "no matching
/// block" case); unscripted addresses and raw bodies are reported as
/// request failures.
#[derive(Default)]
pub struct NullLedgerClient {
    listings: Mutex<HashMap<String, Vec<TxSummary>>>,
    raws: Mutex<HashMap<TxId, String>>,
    blocks: Mutex<HashMap<u64, Vec<BlockInfo>>>,
    fail_raws: Mutex<Vec<TxId>>,
    fail_heights: Mutex<Vec<u64>>,
    stall_heights: Mutex<HashMap<u64, Duration>>,
    listing_calls: AtomicUsize,
    raw_calls: AtomicUsize,
    height_calls: Mutex<HashMap<u64, usize>>,
}

impl NullLedgerClient {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ───────────────────────────────────────────────────────

    pub fn script_listing(&self, address: &Address, txs: Vec<TxSummary>) {
        self.listings
            .lock()
            .unwrap()
            .insert(address.as_str().to_string(), txs);
    }

    pub fn script_raw(&self, id: impl Into<TxId>, raw: impl Into<String>) {
        self.raws.lock().unwrap().insert(id.into(), raw.into());
    }

    pub fn script_blocks(&self, height: u64, blocks: Vec<BlockInfo>) {
        self.blocks.lock().unwrap().insert(height, blocks);
    }

    /// Make raw body fetches for this id fail.
    pub fn fail_raw(&self, id: impl Into<TxId>) {
        self.fail_raws.lock().unwrap().push(id.into());
    }

    /// Make block lookups at this height fail.
    pub fn fail_height(&self, height: u64) {
        self.fail_heights.lock().unwrap().push(height);
    }

    /// Make block lookups at this height hang for `delay` before answering.
    pub fn stall_height(&self, height: u64, delay: Duration) {
        self.stall_heights.lock().unwrap().insert(height, delay);
    }

    // ── Call counters ───────────────────────────────────────────────────

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn raw_calls(&self) -> usize {
        self.raw_calls.load(Ordering::SeqCst)
    }

    pub fn height_calls(&self, height: u64) -> usize {
        self.height_calls
            .lock()
            .unwrap()
            .get(&height)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_height_calls(&self) -> usize {
        self.height_calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl LedgerClient for NullLedgerClient {
    async fn transactions_for_address(
        &self,
        address: &Address,
    ) -> Result<Vec<TxSummary>, ClientError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.listings
            .lock()
            .unwrap()
            .get(address.as_str())
            .cloned()
            .ok_or_else(|| ClientError::RequestFailed(format!("unknown address {address}")))
    }

    async fn raw_transaction(&self, id: &TxId) -> Result<String, ClientError> {
        self.raw_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_raws.lock().unwrap().contains(id) {
            return Err(ClientError::Unreachable(format!(
                "injected failure for {id}"
            )));
        }
        self.raws
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::InvalidResponse(format!("no raw body scripted for {id}")))
    }

    async fn blocks_at_height(&self, height: u64) -> Result<Vec<BlockInfo>, ClientError> {
        *self
            .height_calls
            .lock()
            .unwrap()
            .entry(height)
            .or_insert(0) += 1;

        let stall = self.stall_heights.lock().unwrap().get(&height).copied();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        if self.fail_heights.lock().unwrap().contains(&height) {
            return Err(ClientError::Unreachable(format!(
                "injected failure at height {height}"
            )));
        }
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .get(&height)
            .cloned()
            .unwrap_or_default())
    }
}
