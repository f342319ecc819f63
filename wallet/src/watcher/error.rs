use thiserror::Error;

use crate::pending::StorageError;
use crate::provider::ProviderError;
use crate::types::Receipt;

/// Errors raised inside the watcher.
///
/// None of these escape a polling loop; they are logged and the loop
/// carries on. Only `start` returns them to a caller.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// A provider read exceeded its deadline and was dropped.
    #[error("Cancelled")]
    Cancelled,
    /// Underlying provider failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The pending-transaction store could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// `start` was called more than once.
    #[error("wallet watcher already started")]
    AlreadyStarted,
    /// `start` was called outside a Tokio runtime.
    #[error("wallet watcher must be started from within a Tokio runtime")]
    NoRuntime,
}

/// A tracked transaction was mined but its execution failed.
///
/// Carries the receipt so listeners can show what happened.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransactionError {
    message: String,
    receipt: Receipt,
}

impl TransactionError {
    pub fn new(message: impl Into<String>, receipt: Receipt) -> Self {
        Self {
            message: message.into(),
            receipt,
        }
    }

    /// Returns the receipt of the failed transaction.
    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn into_receipt(self) -> Receipt {
        self.receipt
    }
}
