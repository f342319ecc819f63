//! Watcher instrumentation.
//!
//! [`WatcherMetrics`] counts ticks, failures and dispatched events per loop
//! and tracks the size of the pending store. A service exposes them with
//! [`run_prometheus_http_server`]:
//!
//! ```ignore
//! let registry = Arc::new(MetricsRegistry::new()?);
//! tokio::spawn(run_prometheus_http_server(registry.clone(), cfg.metrics.listen_addr));
//! watcher::start(cfg.watcher, provider, store, Some(registry.watcher.clone()))?;
//! ```

pub mod exporter;
pub mod prometheus;

pub use self::exporter::run_prometheus_http_server;
pub use self::prometheus::{LOOP_ACCOUNT, LOOP_NETWORK, LOOP_PENDING, MetricsRegistry, WatcherMetrics};
