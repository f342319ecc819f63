//! Reactions to wallet watcher events.
//!
//! Account and network events are only logged. A settled transaction is
//! logged and dropped from the pending store so it is not looked up again.

use std::sync::Arc;

use wallet::watcher::{self, EventKind, SubscriptionId, WalletEvent};
use wallet::{PendingTransactionStore, TxHash};

/// Subscribes the gateway handlers to every event kind.
pub fn register(store: Arc<dyn PendingTransactionStore>) -> Vec<(EventKind, SubscriptionId)> {
    EventKind::ALL
        .iter()
        .map(|&kind| {
            let store = store.clone();
            let id = watcher::subscribe(kind, move |event| handle(store.as_ref(), event));
            (kind, id)
        })
        .collect()
}

/// Handles a single event against `store`.
pub fn handle(store: &dyn PendingTransactionStore, event: &WalletEvent) {
    match event {
        WalletEvent::Account(account) => tracing::debug!(%account, "account event"),
        WalletEvent::AccountError(err) => tracing::warn!("wallet account lost: {err}"),
        WalletEvent::Network(chain) => tracing::debug!(%chain, "network event"),
        WalletEvent::NetworkError(err) => tracing::warn!("wallet network lost: {err}"),
        WalletEvent::TransactionComplete { hash, receipt } => {
            tracing::info!(%hash, block = ?receipt.block_number, "transaction completed");
            forget(store, hash);
        }
        WalletEvent::TransactionError { hash, error } => {
            tracing::warn!(
                %hash,
                block = ?error.receipt().block_number,
                "transaction failed: {error}"
            );
            forget(store, hash);
        }
    }
}

fn forget(store: &dyn PendingTransactionStore, hash: &TxHash) {
    if let Err(e) = store.remove(hash) {
        tracing::warn!(%hash, "failed to drop settled transaction: {e}");
    }
}
