//! The enrichment pass: raw bodies, height partitioning, concurrent block
//! resolution, persistence.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

use txtrail_client::LedgerClient;
use txtrail_store::TxCacheStore;
use txtrail_types::{BlockInfo, Transaction, TxSummary};

use crate::EnrichError;

/// Default cap on concurrently resolving height lookups.
const DEFAULT_MAX_CONCURRENT_HEIGHTS: usize = 8;

/// Default per-batch deadline.
const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Tie-break rule when the ledger reports more than one block at a height
/// (fork ambiguity). Applied per height group, never silently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForkPolicy {
    /// Deterministically pick the first candidate the ledger returned whose
    /// height matches.
    #[default]
    FirstReturned,
    /// Treat ambiguity as a failure for that height group; its transactions
    /// are returned hash-absent and left unpersisted.
    Reject,
}

#[derive(Clone, Debug)]
pub struct EnrichConfig {
    /// Cap on concurrent height workers (bounded fan-out).
    pub max_concurrent_heights: usize,
    /// Budget for the whole batch; every network wait runs under it.
    pub deadline: Duration,
    pub fork_policy: ForkPolicy,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            max_concurrent_heights: DEFAULT_MAX_CONCURRENT_HEIGHTS,
            deadline: DEFAULT_DEADLINE,
            fork_policy: ForkPolicy::default(),
        }
    }
}

/// Result of one enrichment batch: every input transaction exactly once
/// (enriched as far as possible), plus whatever went wrong along the way.
#[derive(Debug)]
pub struct EnrichOutcome {
    pub transactions: Vec<Transaction>,
    pub failures: Vec<EnrichError>,
}

/// Drives the enrichment pass for batches of cache-miss transactions.
pub struct Enricher {
    client: Arc<dyn LedgerClient>,
    store: Arc<dyn TxCacheStore>,
    config: EnrichConfig,
}

impl Enricher {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        store: Arc<dyn TxCacheStore>,
        config: EnrichConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Enrich and persist a batch of new transactions.
    ///
    /// Failures never abort the batch: a transaction whose raw body or block
    /// could not be resolved still appears in the outcome (hash absent) and
    /// is left unpersisted so a later request retries it. Unconfirmed
    /// transactions are persisted as-is with no block attached.
    pub async fn enrich(&self, batch: Vec<TxSummary>) -> EnrichOutcome {
        let deadline = Instant::now() + self.config.deadline;
        let mut failures = Vec::new();

        // Positional slots keep the outcome in ledger-listing order while
        // height workers own disjoint subsets of the batch.
        let mut slots: Vec<Option<Transaction>> = Vec::with_capacity(batch.len());
        let mut groups: HashMap<u64, Vec<(usize, Transaction)>> = HashMap::new();

        for (idx, summary) in batch.iter().enumerate() {
            let raw = match timeout_at(deadline, self.client.raw_transaction(&summary.id)).await {
                Ok(Ok(raw)) => Some(raw),
                Ok(Err(e)) => {
                    failures.push(EnrichError::RawFetch {
                        id: summary.id.clone(),
                        source: e,
                    });
                    None
                }
                Err(_) => {
                    failures.push(EnrichError::Deadline {
                        stage: format!("fetching raw body for {}", summary.id),
                    });
                    None
                }
            };

            let Some(raw) = raw else {
                // Returned with an empty body and hash absent, but never
                // persisted: the next request retries the fetch.
                slots.push(Some(Transaction::from_summary(summary, String::new())));
                continue;
            };

            let tx = Transaction::from_summary(summary, raw);
            if tx.is_confirmed() {
                groups
                    .entry(summary.block_height)
                    .or_default()
                    .push((idx, tx));
                slots.push(None);
            } else {
                // Unconfirmed records are cached as-is, hash absent.
                if let Err(e) = self.store.put(&tx) {
                    failures.push(EnrichError::Persist {
                        id: tx.id.clone(),
                        source: e,
                    });
                }
                slots.push(Some(tx));
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_heights));
        let mut workers = JoinSet::new();
        for (height, txs) in groups {
            let client = Arc::clone(&self.client);
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let policy = self.config.fork_policy;
            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                resolve_height(height, txs, client, store, policy, deadline).await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((txs, worker_failures)) => {
                    failures.extend(worker_failures);
                    for (idx, tx) in txs {
                        slots[idx] = Some(tx);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "height worker panicked, its group is lost");
                }
            }
        }

        for failure in &failures {
            tracing::warn!(failure = %failure, "partial enrichment failure");
        }

        EnrichOutcome {
            transactions: slots.into_iter().flatten().collect(),
            failures,
        }
    }
}

/// Resolve one height group: look up the block, merge its hash into every
/// owned transaction, persist each record. The worker owns its transactions
/// outright (each belongs to exactly one height), so no locking is needed
/// around the merge.
async fn resolve_height(
    height: u64,
    mut txs: Vec<(usize, Transaction)>,
    client: Arc<dyn LedgerClient>,
    store: Arc<dyn TxCacheStore>,
    policy: ForkPolicy,
    deadline: Instant,
) -> (Vec<(usize, Transaction)>, Vec<EnrichError>) {
    let mut failures = Vec::new();

    let blocks = match timeout_at(deadline, client.blocks_at_height(height)).await {
        Ok(Ok(blocks)) => blocks,
        Ok(Err(e)) => {
            failures.push(EnrichError::HeightLookup { height, source: e });
            return (txs, failures);
        }
        Err(_) => {
            failures.push(EnrichError::Deadline {
                stage: format!("resolving height {height}"),
            });
            return (txs, failures);
        }
    };

    let chosen = match choose_block(&blocks, height, policy) {
        Ok(Some(block)) => block.clone(),
        Ok(None) => {
            failures.push(EnrichError::NoMatchingBlock { height });
            return (txs, failures);
        }
        Err(e) => {
            failures.push(e);
            return (txs, failures);
        }
    };

    for (_, tx) in &mut txs {
        if let Some(block) = tx.block.as_mut() {
            block.hash = Some(chosen.hash.clone());
        }
        // A put happens only once the hash for this pass is determined, and
        // one failed put must not block the writes that follow it.
        if let Err(e) = store.put(tx) {
            failures.push(EnrichError::Persist {
                id: tx.id.clone(),
                source: e,
            });
        }
    }

    (txs, failures)
}

/// Apply the fork policy to the candidates the ledger reported at `height`.
/// Only candidates whose height actually matches are considered.
fn choose_block(
    blocks: &[BlockInfo],
    height: u64,
    policy: ForkPolicy,
) -> Result<Option<&BlockInfo>, EnrichError> {
    let matching: Vec<&BlockInfo> = blocks.iter().filter(|b| b.height == height).collect();
    match (matching.len(), policy) {
        (0, _) => Ok(None),
        (1, _) => Ok(Some(matching[0])),
        (_, ForkPolicy::FirstReturned) => Ok(Some(matching[0])),
        (n, ForkPolicy::Reject) => Err(EnrichError::ForkAmbiguity {
            height,
            candidates: n,
        }),
    }
}
