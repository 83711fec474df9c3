//! Integration tests exercising the full request pipeline:
//! ledger listing → cache partition → enrichment → persistence → response.
//!
//! These drive the merge-trigger core (`assemble_transactions`) directly,
//! wiring the same collaborators the axum handler uses.

use std::sync::Arc;

use txtrail_client::LedgerClient;
use txtrail_enrich::{EnrichConfig, Enricher};
use txtrail_nullables::{NullCacheStore, NullLedgerClient};
use txtrail_rpc::handlers::assemble_transactions;
use txtrail_rpc::{AppState, RpcError};
use txtrail_store::TxCacheStore;
use txtrail_types::{Address, BlockInfo, TxId, TxSummary};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn summary(id: &str, height: u64) -> TxSummary {
    TxSummary {
        id: TxId::from(id),
        block_height: height,
        time: 1_600_000_000,
    }
}

fn block(hash: &str, height: u64) -> BlockInfo {
    BlockInfo {
        hash: hash.to_string(),
        height,
    }
}

fn state_with(client: &Arc<NullLedgerClient>, store: &Arc<NullCacheStore>) -> AppState {
    let c = Arc::clone(client) as Arc<dyn LedgerClient>;
    let s = Arc::clone(store) as Arc<dyn TxCacheStore>;
    AppState {
        client: Arc::clone(&c),
        store: Arc::clone(&s),
        enricher: Enricher::new(c, s, EnrichConfig::default()),
    }
}

/// Script a fully resolvable confirmed transaction.
fn script_confirmed(client: &NullLedgerClient, id: &str, height: u64, hash: &str) {
    client.script_raw(id, format!("raw-{id}"));
    client.script_blocks(height, vec![block(hash, height)]);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_listed_transaction_appears_exactly_once() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());
    let address = Address::from("addr1");

    client.script_listing(
        &address,
        vec![summary("a", 100), summary("b", 0), summary("c", 200)],
    );
    script_confirmed(&client, "a", 100, "h100");
    client.script_raw("b", "raw-b");
    script_confirmed(&client, "c", 200, "h200");

    let state = state_with(&client, &store);
    let response = assemble_transactions(&state, &address).await.unwrap();

    let mut raws: Vec<&str> = response
        .transactions
        .iter()
        .map(|t| t.raw.as_str())
        .collect();
    raws.sort_unstable();
    assert_eq!(raws, ["raw-a", "raw-b", "raw-c"]);
    assert!(response.errors.is_empty());
}

#[tokio::test]
async fn second_request_is_all_hits_and_fetches_nothing() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());
    let address = Address::from("addr1");

    client.script_listing(&address, vec![summary("a", 100), summary("b", 0)]);
    script_confirmed(&client, "a", 100, "h100");
    client.script_raw("b", "raw-b");

    let state = state_with(&client, &store);
    let first = assemble_transactions(&state, &address).await.unwrap();
    let raw_calls_after_first = client.raw_calls();
    let height_calls_after_first = client.total_height_calls();

    let second = assemble_transactions(&state, &address).await.unwrap();

    // Identical results, zero new enrichment traffic.
    let first_raws: Vec<&str> = first.transactions.iter().map(|t| t.raw.as_str()).collect();
    let second_raws: Vec<&str> = second.transactions.iter().map(|t| t.raw.as_str()).collect();
    assert_eq!(first_raws, second_raws);
    assert_eq!(client.raw_calls(), raw_calls_after_first);
    assert_eq!(client.total_height_calls(), height_calls_after_first);
}

#[tokio::test]
async fn hits_come_before_misses() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());
    let address = Address::from("addr1");

    // "cached" is already in the store; "fresh" is new. The ledger lists the
    // new one first, but hits still lead the response.
    client.script_listing(&address, vec![summary("fresh", 100), summary("cached", 0)]);
    script_confirmed(&client, "fresh", 100, "h100");
    store.seed(txtrail_types::Transaction::from_summary(
        &summary("cached", 0),
        "raw-cached".to_string(),
    ));

    let state = state_with(&client, &store);
    let response = assemble_transactions(&state, &address).await.unwrap();

    assert_eq!(response.transactions[0].raw, "raw-cached");
    assert_eq!(response.transactions[1].raw, "raw-fresh");
}

#[tokio::test]
async fn cached_record_with_hash_is_never_degraded() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());
    let address = Address::from("addr1");

    let mut enriched = txtrail_types::Transaction::from_summary(
        &summary("a", 100),
        "raw-a".to_string(),
    );
    enriched.block.as_mut().unwrap().hash = Some("h100".to_string());
    store.seed(enriched);

    client.script_listing(&address, vec![summary("a", 100)]);

    let state = state_with(&client, &store);
    assemble_transactions(&state, &address).await.unwrap();
    assemble_transactions(&state, &address).await.unwrap();

    // Still a hit, never re-fetched, hash intact.
    assert_eq!(client.raw_calls(), 0);
    let record = store.lookup(&TxId::from("a")).unwrap().unwrap();
    assert_eq!(record.block.unwrap().hash.as_deref(), Some("h100"));
}

#[tokio::test]
async fn miss_set_is_enriched_as_one_batch() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());
    let address = Address::from("addr1");

    // Two misses sharing one height: batch-level enrichment resolves the
    // height once; per-transaction invocation would resolve it twice.
    client.script_listing(&address, vec![summary("a", 100), summary("b", 100)]);
    client.script_raw("a", "raw-a");
    client.script_raw("b", "raw-b");
    client.script_blocks(100, vec![block("h100", 100)]);

    let state = state_with(&client, &store);
    assemble_transactions(&state, &address).await.unwrap();

    assert_eq!(client.height_calls(100), 1);
}

#[tokio::test]
async fn listing_failure_is_request_fatal() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());
    let address = Address::from("unknown");

    let state = state_with(&client, &store);
    let err = assemble_transactions(&state, &address).await.unwrap_err();
    assert!(matches!(err, RpcError::Upstream(_)));
}

#[tokio::test]
async fn empty_address_is_rejected() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());

    let state = state_with(&client, &store);
    let err = assemble_transactions(&state, &Address::from(""))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::InvalidRequest(_)));
}

#[tokio::test]
async fn enrichment_failures_annotate_a_successful_response() {
    let client = Arc::new(NullLedgerClient::new());
    let store = Arc::new(NullCacheStore::new());
    let address = Address::from("addr1");

    client.script_listing(&address, vec![summary("a", 100), summary("b", 200)]);
    script_confirmed(&client, "a", 100, "h100");
    client.script_raw("b", "raw-b");
    client.fail_height(200);

    let state = state_with(&client, &store);
    let response = assemble_transactions(&state, &address).await.unwrap();

    // The request still succeeds with the full transaction set; the failed
    // height shows up as an annotation.
    assert_eq!(response.transactions.len(), 2);
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].contains("height 200"));

    let resolved = store.lookup(&TxId::from("a")).unwrap().unwrap();
    assert_eq!(resolved.block.unwrap().hash.as_deref(), Some("h100"));
    assert!(store.lookup(&TxId::from("b")).unwrap().is_none());
}
