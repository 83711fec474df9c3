//! Nullable infrastructure for deterministic testing.
//!
//! The pipeline's external dependencies (ledger client, cache store) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return scripted values
//! - Count their calls for assertions
//! - Can be armed to fail or stall on demand
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod client;
pub mod store;

pub use client::NullLedgerClient;
pub use store::NullCacheStore;
