//! Nullable cache store — thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use txtrail_store::{StoreError, TxCacheStore};
use txtrail_types::{Transaction, TxId};

/// An in-memory transaction cache for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullCacheStore {
    records: Mutex<HashMap<TxId, Transaction>>,
    fail_puts_for: Mutex<Vec<TxId>>,
}

impl NullCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` of this id fail with a backend error.
    pub fn fail_put_for(&self, id: TxId) {
        self.fail_puts_for.lock().unwrap().push(id);
    }

    /// Seed a record directly, bypassing the trait (for arranging hits).
    pub fn seed(&self, tx: Transaction) {
        self.records.lock().unwrap().insert(tx.id.clone(), tx);
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl TxCacheStore for NullCacheStore {
    fn ensure_container(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn lookup(&self, id: &TxId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    fn put(&self, tx: &Transaction) -> Result<(), StoreError> {
        if self.fail_puts_for.lock().unwrap().contains(&tx.id) {
            return Err(StoreError::Backend(format!(
                "injected write failure for {}",
                tx.id
            )));
        }
        self.records
            .lock()
            .unwrap()
            .insert(tx.id.clone(), tx.clone());
        Ok(())
    }
}
