//! LMDB implementation of TxCacheStore.
//!
//! One environment, one named database holding bincode-encoded transactions
//! keyed by id bytes. Every put runs in its own write transaction, so a
//! failed write aborts cleanly without touching committed records.

use std::path::Path;
use std::sync::OnceLock;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use txtrail_store::{StoreError, TxCacheStore};
use txtrail_types::{Transaction, TxId};

use crate::LmdbError;

/// Default LMDB map size: 1 GiB, plenty for an append-only record cache.
const DEFAULT_MAP_SIZE: usize = 1 << 30;

pub struct LmdbCacheStore {
    env: Env,
    container: String,
    records_db: OnceLock<Database<Bytes, Bytes>>,
}

impl LmdbCacheStore {
    /// Open (or create) the cache environment at `path`.
    ///
    /// The named container is not created here; call
    /// [`TxCacheStore::ensure_container`] once at startup.
    pub fn open(path: &Path, container: &str) -> Result<Self, StoreError> {
        Self::open_with_map_size(path, container, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(
        path: &Path,
        container: &str,
        map_size: usize,
    ) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)
            .map_err(|e| StoreError::Backend(format!("create cache dir: {e}")))?;
        // Safety: the daemon opens the cache environment exactly once per
        // process; no other handle to this path exists.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(4)
                .open(path)
        }
        .map_err(LmdbError::from)?;
        Ok(Self {
            env,
            container: container.to_string(),
            records_db: OnceLock::new(),
        })
    }

    fn db(&self) -> Result<Database<Bytes, Bytes>, StoreError> {
        self.records_db
            .get()
            .copied()
            .ok_or_else(|| LmdbError::ContainerMissing(self.container.clone()).into())
    }
}

impl TxCacheStore for LmdbCacheStore {
    fn ensure_container(&self) -> Result<(), StoreError> {
        if self.records_db.get().is_some() {
            return Ok(());
        }
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let db = self
            .env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some(&self.container))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        let _ = self.records_db.set(db);
        Ok(())
    }

    fn lookup(&self, id: &TxId) -> Result<Option<Transaction>, StoreError> {
        let db = self.db()?;
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(bytes) = db.get(&rtxn, id.as_bytes()).map_err(LmdbError::from)? else {
            return Ok(None);
        };
        match bincode::deserialize::<Transaction>(bytes) {
            Ok(tx) => Ok(Some(tx)),
            // A corrupt record is reported as a miss: the caller falls back
            // to re-fetching and the next put overwrites the bad value.
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "cached record failed to decode, treating as miss");
                Ok(None)
            }
        }
    }

    fn put(&self, tx: &Transaction) -> Result<(), StoreError> {
        let db = self.db()?;
        let bytes = bincode::serialize(tx).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        db.put(&mut wtxn, tx.id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txtrail_types::TxSummary;

    fn open_test_store() -> (tempfile::TempDir, LmdbCacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbCacheStore::open_with_map_size(dir.path(), "transactions", 1 << 20).unwrap();
        store.ensure_container().unwrap();
        (dir, store)
    }

    fn confirmed_tx(id: &str, height: u64) -> Transaction {
        let summary = TxSummary {
            id: TxId::from(id),
            block_height: height,
            time: 1_600_000_000,
        };
        Transaction::from_summary(&summary, format!("raw-{id}"))
    }

    #[test]
    fn lookup_before_ensure_container_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            LmdbCacheStore::open_with_map_size(dir.path(), "transactions", 1 << 20).unwrap();
        assert!(store.lookup(&TxId::from("tx1")).is_err());
    }

    #[test]
    fn ensure_container_is_idempotent() {
        let (_dir, store) = open_test_store();
        store.ensure_container().unwrap();
        store.ensure_container().unwrap();
    }

    #[test]
    fn lookup_miss_is_none() {
        let (_dir, store) = open_test_store();
        assert!(store.lookup(&TxId::from("absent")).unwrap().is_none());
    }

    #[test]
    fn put_then_lookup_roundtrip() {
        let (_dir, store) = open_test_store();
        let tx = confirmed_tx("tx2", 100);
        store.put(&tx).unwrap();
        assert_eq!(store.lookup(&tx.id).unwrap(), Some(tx));
    }

    #[test]
    fn put_overwrites_existing_value() {
        let (_dir, store) = open_test_store();
        let mut tx = confirmed_tx("tx2", 100);
        store.put(&tx).unwrap();

        tx.block.as_mut().unwrap().hash = Some("00000000abcd".to_string());
        store.put(&tx).unwrap();

        let got = store.lookup(&tx.id).unwrap().unwrap();
        assert_eq!(got.block.unwrap().hash.as_deref(), Some("00000000abcd"));
    }

    #[test]
    fn corrupt_record_reads_as_miss() {
        let (_dir, store) = open_test_store();
        let id = TxId::from("garbled");

        // Write undecodable bytes under the key, bypassing put().
        let db = store.db().unwrap();
        let mut wtxn = store.env.write_txn().unwrap();
        db.put(&mut wtxn, id.as_bytes(), b"\xff\xff\xff not bincode")
            .unwrap();
        wtxn.commit().unwrap();

        assert!(store.lookup(&id).unwrap().is_none());
    }
}
