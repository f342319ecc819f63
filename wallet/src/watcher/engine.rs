//! Polling engine behind the wallet watcher.
//!
//! The engine wires together:
//!
//! - a [`WalletProvider`] for account, chain and transaction reads,
//! - a [`PendingTransactionStore`] listing submitted transactions,
//! - a [`ListenerRegistry`] that receives the resulting events, and
//! - optional [`WatcherMetrics`].
//!
//! Each `poll_*` method is one tick of one loop. `spawn` runs the three
//! loops as independent Tokio tasks that sleep for their interval after
//! every tick.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures_util::future::join_all;
use tokio::task::JoinHandle;

use crate::metrics::{LOOP_ACCOUNT, LOOP_NETWORK, LOOP_PENDING, WatcherMetrics};
use crate::pending::PendingTransactionStore;
use crate::provider::{ProviderError, WalletProvider};
use crate::types::{Address, ChainId, PendingTxRecord, Receipt, TxHash};

use super::config::WatcherConfig;
use super::error::{TransactionError, WatcherError};
use super::events::WalletEvent;
use super::registry::ListenerRegistry;
use super::warn::WarnOnce;

/// Point-in-time view of what the watcher knows.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct WatcherSnapshot {
    pub account: Option<Address>,
    pub network_id: Option<ChainId>,
}

/// Wallet/network/pending-transaction watcher.
///
/// `account` and `network_id` are written only by their own loop. Events
/// are dispatched after the state lock is released, so handlers may read a
/// [`WatcherSnapshot`] that already reflects the change.
pub struct WalletWatcher {
    config: WatcherConfig,
    provider: Arc<dyn WalletProvider>,
    store: Arc<dyn PendingTransactionStore>,
    listeners: Arc<ListenerRegistry>,
    metrics: Option<WatcherMetrics>,
    state: Mutex<WatcherSnapshot>,
    /// Hashes whose outcome has already been emitted.
    reported: Mutex<HashSet<TxHash>>,
    warnings: WarnOnce,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WalletWatcher {
    pub(crate) fn new(
        config: WatcherConfig,
        provider: Arc<dyn WalletProvider>,
        store: Arc<dyn PendingTransactionStore>,
        listeners: Arc<ListenerRegistry>,
        metrics: Option<WatcherMetrics>,
    ) -> Self {
        Self {
            config,
            provider,
            store,
            listeners,
            metrics,
            state: Mutex::new(WatcherSnapshot::default()),
            reported: Mutex::new(HashSet::new()),
            warnings: WarnOnce::new(),
        }
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn snapshot(&self) -> WatcherSnapshot {
        lock(&self.state).clone()
    }

    /// Starts the three polling loops on the current Tokio runtime.
    pub(crate) fn spawn(self: &Arc<Self>) -> [JoinHandle<()>; 3] {
        let account = {
            let this = self.clone();
            tokio::spawn(async move {
                loop {
                    this.poll_account().await;
                    tokio::time::sleep(this.config.account_poll_interval).await;
                }
            })
        };
        let network = {
            let this = self.clone();
            tokio::spawn(async move {
                loop {
                    this.poll_network().await;
                    tokio::time::sleep(this.config.network_poll_interval).await;
                }
            })
        };
        let pending = {
            let this = self.clone();
            tokio::spawn(async move {
                loop {
                    this.poll_pending_transactions().await;
                    tokio::time::sleep(this.config.pending_tx_poll_interval).await;
                }
            })
        };
        [account, network, pending]
    }

    fn emit(&self, event: WalletEvent) {
        tracing::debug!(event = %event.kind(), "dispatching wallet event");
        if let Some(m) = &self.metrics {
            m.events_total
                .with_label_values(&[event.kind().as_str()])
                .inc();
        }
        self.listeners.dispatch(&event);
    }

    fn record_tick(&self, loop_name: &str, started: Instant, failed: bool) {
        let Some(m) = &self.metrics else {
            return;
        };
        m.polls_total.with_label_values(&[loop_name]).inc();
        m.poll_seconds
            .with_label_values(&[loop_name])
            .observe(started.elapsed().as_secs_f64());
        if failed {
            m.poll_failures_total.with_label_values(&[loop_name]).inc();
        }
    }

    // ---------------------------
    // Account loop
    // ---------------------------

    /// One tick of the account loop.
    pub async fn poll_account(&self) {
        let started = Instant::now();
        let result = self.provider.default_account().await;
        let failed = result.is_err();

        match result {
            Ok(account) => self.handle_account(account),
            Err(err) => self.handle_account_error(err),
        }

        self.record_tick(LOOP_ACCOUNT, started, failed);
    }

    fn handle_account(&self, next: Address) {
        // Hold the account back until the wallet granted access.
        if !self.provider.has_provider() {
            return;
        }

        let changed = {
            let mut state = lock(&self.state);
            if state.account.as_ref() == Some(&next) {
                false
            } else {
                state.account = Some(next.clone());
                true
            }
        };

        if changed {
            tracing::info!(account = %next, "wallet account changed");
            self.emit(WalletEvent::Account(next));
        }
    }

    fn handle_account_error(&self, err: ProviderError) {
        let had_account = lock(&self.state).account.take().is_some();
        if had_account {
            tracing::info!("wallet account lost: {err}");
            self.emit(WalletEvent::AccountError(err));
        } else {
            self.warnings.warn(LOOP_ACCOUNT, &err);
        }
    }

    // ---------------------------
    // Network loop
    // ---------------------------

    async fn fetch_chain_id(&self) -> Result<ChainId, WatcherError> {
        // Dropping the provider future on timeout cancels the read.
        match tokio::time::timeout(self.config.network_poll_interval, self.provider.chain_id())
            .await
        {
            Ok(res) => res.map_err(WatcherError::from),
            Err(_elapsed) => Err(WatcherError::Cancelled),
        }
    }

    /// One tick of the network loop.
    pub async fn poll_network(&self) {
        let started = Instant::now();
        let result = self.fetch_chain_id().await;
        let failed = result.is_err();

        match result {
            Ok(chain) => self.handle_network(chain),
            Err(WatcherError::Provider(err)) => self.handle_network_error(err),
            Err(other) => {
                self.warnings.warn(LOOP_NETWORK, &other);
            }
        }

        self.record_tick(LOOP_NETWORK, started, failed);
    }

    fn handle_network(&self, next: ChainId) {
        let changed = {
            let mut state = lock(&self.state);
            if state.network_id.as_ref() == Some(&next) {
                false
            } else {
                state.network_id = Some(next.clone());
                true
            }
        };

        if changed {
            tracing::info!(chain_id = %next, "wallet network changed");
            self.emit(WalletEvent::Network(next));
        }
    }

    fn handle_network_error(&self, err: ProviderError) {
        let had_network = lock(&self.state).network_id.take().is_some();
        if had_network {
            tracing::info!("wallet network lost: {err}");
            self.emit(WalletEvent::NetworkError(err));
        } else {
            self.warnings.warn(LOOP_NETWORK, &err);
        }
    }

    // ---------------------------
    // Pending-transaction loop
    // ---------------------------

    /// One sweep over every tracked transaction.
    pub async fn poll_pending_transactions(&self) {
        let started = Instant::now();
        let failed = match self.sweep_pending().await {
            Ok(()) => false,
            Err(err) => {
                self.warnings.warn(LOOP_PENDING, &err);
                true
            }
        };
        self.record_tick(LOOP_PENDING, started, failed);
    }

    async fn sweep_pending(&self) -> Result<(), WatcherError> {
        let txs = self.store.transactions()?;
        if let Some(m) = &self.metrics {
            m.pending_transactions
                .set(i64::try_from(txs.len()).unwrap_or(i64::MAX));
        }
        let to_check = self.unreported(&txs);
        if to_check.is_empty() {
            return Ok(());
        }

        let chain = self.chain_for_lookups().await?;
        join_all(to_check.iter().map(|hash| self.check_transaction(hash, &chain))).await;
        Ok(())
    }

    /// Forgets reported hashes no longer in the store and returns the
    /// tracked hashes whose outcome has not been emitted yet.
    fn unreported(&self, txs: &BTreeMap<TxHash, PendingTxRecord>) -> Vec<TxHash> {
        let mut reported = lock(&self.reported);
        reported.retain(|h| txs.contains_key(h));
        txs.keys()
            .filter(|h| !reported.contains(*h))
            .cloned()
            .collect()
    }

    async fn chain_for_lookups(&self) -> Result<ChainId, WatcherError> {
        let known = lock(&self.state).network_id.clone();
        match known {
            Some(chain) => Ok(chain),
            None => self.fetch_chain_id().await,
        }
    }

    async fn lookup(&self, hash: &TxHash, chain: &ChainId) -> Result<Option<Receipt>, ProviderError> {
        if !self.provider.has_transaction_completed(hash, chain).await? {
            return Ok(None);
        }
        self.provider.transaction_receipt(hash, chain).await
    }

    async fn check_transaction(&self, hash: &TxHash, chain: &ChainId) {
        let receipt = match self.lookup(hash, chain).await {
            Ok(Some(receipt)) => receipt,
            // Not mined yet, or mined but the receipt is not served yet.
            Ok(None) => return,
            Err(err) => {
                self.warnings.warn(LOOP_PENDING, &err);
                return;
            }
        };

        if !lock(&self.reported).insert(hash.clone()) {
            return;
        }

        if receipt.succeeded() {
            tracing::info!(tx = %hash, "transaction complete");
            self.emit(WalletEvent::TransactionComplete {
                hash: hash.clone(),
                receipt,
            });
        } else {
            tracing::info!(tx = %hash, "transaction failed");
            self.emit(WalletEvent::TransactionError {
                hash: hash.clone(),
                error: TransactionError::new("Transaction failed", receipt),
            });
        }
    }
}
