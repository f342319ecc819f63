//! Wallet watcher.
//!
//! Continuously reconciles three external facts and notifies listeners
//! exactly when one of them changes:
//!
//! - the active wallet account ([`EventKind::Account`] /
//!   [`EventKind::AccountError`]),
//! - the selected chain ([`EventKind::Network`] /
//!   [`EventKind::NetworkError`]),
//! - the outcome of submitted transactions
//!   ([`EventKind::TransactionComplete`] /
//!   [`EventKind::TransactionError`]).
//!
//! There is one watcher per process. It is created by [`start`] and is only
//! reachable through the free functions of this module; listeners may be
//! registered before or after it starts.
//!
//! ```ignore
//! use std::sync::Arc;
//! use wallet::watcher::{self, EventKind, WalletEvent, WatcherConfig};
//!
//! watcher::start(WatcherConfig::default(), provider, store, None)?;
//! let id = watcher::subscribe(EventKind::Account, |ev| {
//!     if let WalletEvent::Account(addr) = ev {
//!         tracing::info!(%addr, "account changed");
//!     }
//! });
//! watcher::unsubscribe(EventKind::Account, id);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod registry;
pub mod warn;

use std::sync::{Arc, LazyLock, OnceLock};

use crate::metrics::WatcherMetrics;
use crate::pending::PendingTransactionStore;
use crate::provider::WalletProvider;

pub use config::WatcherConfig;
pub use engine::{WalletWatcher, WatcherSnapshot};
pub use error::{TransactionError, WatcherError};
pub use events::{EventKind, WalletEvent};
pub use registry::{Handler, ListenerRegistry, SubscriptionId};

static LISTENERS: LazyLock<Arc<ListenerRegistry>> =
    LazyLock::new(|| Arc::new(ListenerRegistry::new()));

static WATCHER: OnceLock<Arc<WalletWatcher>> = OnceLock::new();

/// Creates the process-wide watcher and starts its polling loops.
///
/// Must be called from within a Tokio runtime. A second call fails with
/// [`WatcherError::AlreadyStarted`] and leaves the running watcher alone.
pub fn start(
    config: WatcherConfig,
    provider: Arc<dyn WalletProvider>,
    store: Arc<dyn PendingTransactionStore>,
    metrics: Option<WatcherMetrics>,
) -> Result<(), WatcherError> {
    if tokio::runtime::Handle::try_current().is_err() {
        return Err(WatcherError::NoRuntime);
    }

    let watcher = Arc::new(WalletWatcher::new(
        config,
        provider,
        store,
        LISTENERS.clone(),
        metrics,
    ));
    WATCHER
        .set(watcher.clone())
        .map_err(|_| WatcherError::AlreadyStarted)?;

    // The loops run until the process exits; their handles are not needed.
    let _ = watcher.spawn();
    tracing::info!(config = ?watcher.config(), "wallet watcher started");
    Ok(())
}

/// Returns `true` once [`start`] has succeeded.
pub fn is_started() -> bool {
    WATCHER.get().is_some()
}

/// Registers `handler` for events of `kind`.
pub fn subscribe<F>(kind: EventKind, handler: F) -> SubscriptionId
where
    F: Fn(&WalletEvent) + Send + Sync + 'static,
{
    LISTENERS.subscribe(kind, handler)
}

/// Removes a handler registered with [`subscribe`].
pub fn unsubscribe(kind: EventKind, id: SubscriptionId) -> bool {
    LISTENERS.unsubscribe(kind, id)
}

/// Current account and network, or `None` before [`start`].
pub fn snapshot() -> Option<WatcherSnapshot> {
    WATCHER.get().map(|w| w.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::InMemoryPendingStore;
    use crate::provider::HttpWalletProvider;
    use std::time::Duration;

    fn provider() -> Arc<dyn WalletProvider> {
        Arc::new(HttpWalletProvider::new("", Duration::from_millis(100)).expect("client"))
    }

    #[test]
    fn start_outside_runtime_is_rejected() {
        let res = start(
            WatcherConfig::default(),
            provider(),
            Arc::new(InMemoryPendingStore::new()),
            None,
        );
        assert!(matches!(res, Err(WatcherError::NoRuntime)));
    }

    #[tokio::test]
    async fn process_wide_watcher_starts_once() {
        let id = subscribe(EventKind::Network, |_| {});

        let first = start(
            WatcherConfig::default(),
            provider(),
            Arc::new(InMemoryPendingStore::new()),
            None,
        );
        assert!(first.is_ok());
        assert!(is_started());
        assert_eq!(snapshot(), Some(WatcherSnapshot::default()));

        let second = start(
            WatcherConfig::default(),
            provider(),
            Arc::new(InMemoryPendingStore::new()),
            None,
        );
        assert!(matches!(second, Err(WatcherError::AlreadyStarted)));

        assert!(unsubscribe(EventKind::Network, id));
    }
}
