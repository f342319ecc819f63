//! Pending-transaction stores.
//!
//! The component that submits a transaction records it here; the watcher
//! only reads the current snapshot on every pending-transaction tick. Two
//! backends are provided:
//!
//! - an in-memory store ([`mem::InMemoryPendingStore`]) for tests and
//!   short-lived sessions,
//! - a RocksDB-backed store ([`rocksdb::RocksDbPendingStore`]) that keeps
//!   the list across restarts of the process.

pub mod mem;
pub mod rocksdb;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::{PendingTxRecord, TxHash};

pub use mem::InMemoryPendingStore;
pub use rocksdb::{RocksDbConfig, RocksDbPendingStore};

/// Storage-level error type.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying RocksDB error.
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] ::rocksdb::Error),
    /// Required column family was not found.
    #[error("missing column family {0:?}")]
    MissingColumnFamily(&'static str),
    /// A stored key or record could not be decoded.
    #[error("corrupted entry: {0}")]
    Corrupted(String),
    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Durable, session-scoped list of submitted transactions.
///
/// Implementations use interior mutability: the same store is shared
/// between the watcher (reader) and whichever component records and clears
/// transactions (writer).
pub trait PendingTransactionStore: Send + Sync {
    /// Returns every tracked transaction keyed by hash.
    fn transactions(&self) -> Result<BTreeMap<TxHash, PendingTxRecord>, StorageError>;

    /// Starts tracking a transaction, replacing any previous record.
    fn add(&self, hash: TxHash, record: PendingTxRecord) -> Result<(), StorageError>;

    /// Stops tracking a transaction. Returns `true` if it was tracked.
    fn remove(&self, hash: &TxHash) -> Result<bool, StorageError>;
}
