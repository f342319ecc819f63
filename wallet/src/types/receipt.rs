// wallet/src/types/receipt.rs

//! Receipts of mined transactions.

use serde::{Deserialize, Serialize};

use super::TxHash;

/// Outcome of a mined transaction, as reported by the provider.
///
/// Only the fields the watcher and its listeners care about are kept.
/// `status` is `true` for a successful execution and `false` for a
/// reverted one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the transaction this receipt belongs to.
    pub transaction_hash: TxHash,
    /// Block the transaction was mined in.
    pub block_number: Option<u64>,
    /// Hash of that block, `0x`-prefixed.
    pub block_hash: Option<String>,
    /// Gas consumed by the transaction.
    pub gas_used: Option<u64>,
    /// Execution status.
    pub status: bool,
}

impl Receipt {
    /// Returns `true` if the transaction executed successfully.
    pub fn succeeded(&self) -> bool {
        self.status
    }
}
