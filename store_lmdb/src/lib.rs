//! LMDB cache backend for txtrail.
//!
//! Implements the `TxCacheStore` trait from `txtrail-store` using the `heed`
//! LMDB bindings. All records live in one named database (the "bucket")
//! within a single environment; values are bincode-encoded transactions.

pub mod cache;
pub mod error;

pub use cache::LmdbCacheStore;
pub use error::LmdbError;
