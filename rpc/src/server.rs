//! Axum-based HTTP server.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use txtrail_client::LedgerClient;
use txtrail_enrich::Enricher;
use txtrail_store::TxCacheStore;
use txtrail_types::Address;

use crate::handlers::{assemble_transactions, GetTransactionsRequest, GetTransactionsResponse};
use crate::RpcError;

/// Shared state for request handlers: the collaborators are constructed once
/// at startup and injected here — no ambient globals.
pub struct AppState {
    pub client: Arc<dyn LedgerClient>,
    pub store: Arc<dyn TxCacheStore>,
    pub enricher: Enricher,
}

pub struct RpcServer {
    port: u16,
    state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<AppState>) -> Self {
        Self { port, state }
    }

    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/gettransactions", get(get_transactions))
            .with_state(state)
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(&self) -> Result<(), RpcError> {
        let router = Self::router(Arc::clone(&self.state));
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", self.port))
            .await
            .map_err(|e| RpcError::Server(format!("bind port {}: {e}", self.port)))?;
        info!("RPC server listening on port {}", self.port);
        axum::serve(listener, router)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}

async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Query(req): Query<GetTransactionsRequest>,
) -> Result<Json<GetTransactionsResponse>, RpcError> {
    let address = Address::new(req.address);
    let response = assemble_transactions(&state, &address).await?;
    Ok(Json(response))
}
