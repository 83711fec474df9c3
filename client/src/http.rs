//! HTTP implementation of [`LedgerClient`] for blockchain.info-compatible
//! APIs.
//!
//! Endpoints consumed:
//! - `GET {base}/rawaddr/{address}` — address transaction listing (JSON)
//! - `GET {base}/rawtx/{id}?format=hex` — raw transaction body (plain text)
//! - `GET {base}/block-height/{height}?format=json` — blocks at a height

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use txtrail_types::{Address, BlockInfo, TxId, TxSummary};

use crate::{ClientError, LedgerClient};

/// Default timeout for ledger requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reqwest-backed ledger client (reusable connection pool).
pub struct HttpLedgerClient {
    http_client: reqwest::Client,
    base_url: String,
}

/// Raw JSON listing from `GET /rawaddr/{address}`. Only the fields the
/// pipeline consumes are modeled; the rest of the payload is ignored.
#[derive(Debug, Deserialize)]
struct AddressResponse {
    txs: Vec<AddressTx>,
}

#[derive(Debug, Deserialize)]
struct AddressTx {
    hash: String,
    /// Absent in the wire JSON while the transaction is unconfirmed; the
    /// source ledger's convention maps that to height 0.
    #[serde(default)]
    block_height: u64,
    #[serde(default)]
    time: u64,
}

/// Raw JSON from `GET /block-height/{height}?format=json`.
#[derive(Debug, Deserialize)]
struct BlockHeightResponse {
    blocks: Vec<BlockEntry>,
}

#[derive(Debug, Deserialize)]
struct BlockEntry {
    hash: String,
    height: u64,
}

impl HttpLedgerClient {
    /// Create a client for the given API base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ClientError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Unreachable(format!("request timed out: {e}"))
            } else if e.is_connect() {
                ClientError::Unreachable(format!("connection failed: {e}"))
            } else {
                ClientError::RequestFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ClientError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn transactions_for_address(
        &self,
        address: &Address,
    ) -> Result<Vec<TxSummary>, ClientError> {
        let url = format!("{}/rawaddr/{}", self.base_url, address);
        let listing: AddressResponse = self.get(&url).await?.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse address listing: {e}"))
        })?;

        Ok(listing
            .txs
            .into_iter()
            .map(|t| TxSummary {
                id: TxId::new(t.hash),
                block_height: t.block_height,
                time: t.time,
            })
            .collect())
    }

    async fn raw_transaction(&self, id: &TxId) -> Result<String, ClientError> {
        let url = format!("{}/rawtx/{}?format=hex", self.base_url, id);
        self.get(&url)
            .await?
            .text()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("failed to read raw body: {e}")))
    }

    async fn blocks_at_height(&self, height: u64) -> Result<Vec<BlockInfo>, ClientError> {
        let url = format!("{}/block-height/{}?format=json", self.base_url, height);
        let resp: BlockHeightResponse = self.get(&url).await?.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse block listing: {e}"))
        })?;

        Ok(resp
            .blocks
            .into_iter()
            .map(|b| BlockInfo {
                hash: b.hash,
                height: b.height,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_listing_parses_confirmed_and_unconfirmed() {
        let json = r#"{
            "address": "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
            "txs": [
                {"hash": "tx1", "time": 1600000000},
                {"hash": "tx2", "block_height": 100, "time": 1600000100}
            ]
        }"#;
        let listing: AddressResponse = serde_json::from_str(json).unwrap();
        assert_eq!(listing.txs.len(), 2);
        assert_eq!(listing.txs[0].block_height, 0);
        assert_eq!(listing.txs[1].block_height, 100);
        assert_eq!(listing.txs[1].hash, "tx2");
    }

    #[test]
    fn block_height_listing_parses_fork_candidates() {
        let json = r#"{
            "blocks": [
                {"hash": "abc", "height": 100, "time": 1600000100},
                {"hash": "def", "height": 100, "time": 1600000101}
            ]
        }"#;
        let resp: BlockHeightResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.blocks.len(), 2);
        assert_eq!(resp.blocks[0].hash, "abc");
        assert_eq!(resp.blocks[1].height, 100);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = HttpLedgerClient::new("https://ledger.example/");
        assert_eq!(client.base_url, "https://ledger.example");
    }
}
