//! Fundamental types for the txtrail service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: transaction ids, addresses, block metadata and the cached
//! transaction record.

pub mod address;
pub mod block;
pub mod id;
pub mod listing;
pub mod transaction;

pub use address::Address;
pub use block::Block;
pub use id::TxId;
pub use listing::{BlockInfo, TxSummary};
pub use transaction::Transaction;
