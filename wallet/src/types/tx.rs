// wallet/src/types/tx.rs

//! Locally tracked transactions.
//!
//! When the user submits a transaction through the wallet, the submitting
//! component records it in a [`crate::pending::PendingTransactionStore`]
//! keyed by its hash. The watcher then polls the provider for the outcome.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Record kept for each submitted, not-yet-confirmed transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTxRecord {
    /// Submission time, in seconds since Unix epoch.
    pub submitted_at: u64,

    /// Free-form metadata supplied by the submitter.
    ///
    /// Typically describes what the transaction does (e.g. a purchase or an
    /// allowance change) so that a completion notice can be rendered
    /// without another lookup.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl PendingTxRecord {
    /// Creates a record stamped with the current wall-clock time.
    pub fn now(metadata: serde_json::Value) -> Self {
        Self {
            submitted_at: current_unix_timestamp(),
            metadata,
        }
    }
}

/// Returns the current wall-clock time as seconds since Unix epoch.
///
/// On error (system clock before epoch) this falls back to 0.
pub fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs()
}
