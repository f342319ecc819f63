//! In-memory pending-transaction store.
//!
//! Keeps all records in a `BTreeMap` keyed by [`TxHash`]. Contents are lost
//! when the process exits, which matches a browser-session lifetime.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::pending::{PendingTransactionStore, StorageError};
use crate::types::{PendingTxRecord, TxHash};

/// In-memory implementation of [`PendingTransactionStore`].
#[derive(Default)]
pub struct InMemoryPendingStore {
    txs: RwLock<BTreeMap<TxHash, PendingTxRecord>>,
}

impl InMemoryPendingStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tracked transactions.
    pub fn len(&self) -> usize {
        self.txs.read().map(|m| m.len()).unwrap_or_default()
    }

    /// Returns `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PendingTransactionStore for InMemoryPendingStore {
    fn transactions(&self) -> Result<BTreeMap<TxHash, PendingTxRecord>, StorageError> {
        let guard = self.txs.read().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn add(&self, hash: TxHash, record: PendingTxRecord) -> Result<(), StorageError> {
        let mut guard = self.txs.write().map_err(|_| StorageError::Poisoned)?;
        guard.insert(hash, record);
        Ok(())
    }

    fn remove(&self, hash: &TxHash) -> Result<bool, StorageError> {
        let mut guard = self.txs.write().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.remove(hash).is_some())
    }
}
