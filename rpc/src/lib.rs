//! HTTP API for txtrail.
//!
//! One endpoint: `GET /gettransactions?address=...` returns every
//! transaction the ledger associates with the address, served from the
//! cache where possible and enriched on demand otherwise.
//!
//! The merge-trigger logic (partition into hits and misses, one enrichment
//! batch per request, hits-before-misses assembly) lives in
//! [`handlers::assemble_transactions`] so tests can drive it without HTTP.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{AppState, RpcServer};
