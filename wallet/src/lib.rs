//! Wallet library crate.
//!
//! This crate provides the building blocks a marketplace backend needs to
//! follow a user's Ethereum wallet and to edit products safely once they
//! are published:
//!
//! - strongly-typed domain types (`types`),
//! - the wallet provider seam and a JSON-RPC client (`provider`),
//! - pending-transaction stores (`pending`),
//! - the process-wide wallet watcher (`watcher`),
//! - staged edits for published products (`product`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level service configuration (`config`).
//!
//! Higher-level binaries compose these pieces; see the `wallet-gateway`
//! crate for the HTTP service built on top of them.

pub mod config;
pub mod metrics;
pub mod pending;
pub mod product;
pub mod provider;
pub mod types;
pub mod watcher;

// Re-export top-level configuration types.
pub use config::{ConfigError, MetricsConfig, ProviderConfig, WalletConfig};

// Re-export the provider seam and the HTTP client.
pub use provider::{HttpWalletProvider, ProviderError, WalletProvider};

// Re-export pending-transaction stores.
pub use pending::{
    InMemoryPendingStore, PendingTransactionStore, RocksDbConfig, RocksDbPendingStore,
    StorageError,
};

// Re-export the watcher surface.
pub use watcher::{
    EventKind, SubscriptionId, TransactionError, WalletEvent, WatcherConfig, WatcherError,
    WatcherSnapshot,
};

// Re-export product state types.
pub use product::{Fields, Product, ProductError, ProductState};

// Re-export metrics registry and watcher metrics.
pub use metrics::{MetricsRegistry, WatcherMetrics, run_prometheus_http_server};

// Re-export domain types at the crate root for convenience.
pub use types::*;
