//! Prometheus metric definitions for the watcher loops.
//!
//! [`MetricsRegistry`] owns a namespaced Prometheus registry holding one
//! [`WatcherMetrics`] set. The `/metrics` endpoint lives in
//! [`super::exporter`].

use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, core::Collector,
};

/// Label values for the three polling loops.
pub const LOOP_ACCOUNT: &str = "account";
pub const LOOP_NETWORK: &str = "network";
pub const LOOP_PENDING: &str = "pending_transactions";

/// Histogram buckets for one tick; ticks are dominated by provider round-trips.
const POLL_BUCKETS: [f64; 11] = [
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Metrics updated by [`crate::watcher::WalletWatcher`] on every tick.
#[derive(Clone)]
pub struct WatcherMetrics {
    /// Completed polling ticks, labelled by loop.
    pub polls_total: IntCounterVec,
    /// Failed or cancelled ticks, labelled by loop.
    pub poll_failures_total: IntCounterVec,
    /// Events dispatched to listeners, labelled by event kind.
    pub events_total: IntCounterVec,
    /// Duration of a single polling tick, labelled by loop.
    pub poll_seconds: HistogramVec,
    /// Number of transactions in the pending store at the last tick.
    pub pending_transactions: IntGauge,
}

fn registered<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

fn per_loop_counter(name: &str, help: &str) -> Result<IntCounterVec, prometheus::Error> {
    IntCounterVec::new(Opts::new(name, help), &["loop"])
}

impl WatcherMetrics {
    /// Creates the watcher metrics and registers them into `registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            polls_total: registered(
                registry,
                per_loop_counter("watcher_polls_total", "Polling ticks per loop")?,
            )?,
            poll_failures_total: registered(
                registry,
                per_loop_counter(
                    "watcher_poll_failures_total",
                    "Failed or cancelled polling ticks per loop",
                )?,
            )?,
            events_total: registered(
                registry,
                IntCounterVec::new(
                    Opts::new("watcher_events_total", "Events dispatched per event kind"),
                    &["kind"],
                )?,
            )?,
            poll_seconds: registered(
                registry,
                HistogramVec::new(
                    HistogramOpts::new("watcher_poll_seconds", "Polling tick duration")
                        .buckets(POLL_BUCKETS.to_vec()),
                    &["loop"],
                )?,
            )?,
            pending_transactions: registered(
                registry,
                IntGauge::with_opts(Opts::new(
                    "watcher_pending_transactions",
                    "Transactions listed by the pending store at the last tick",
                ))?,
            )?,
        })
    }
}

/// Registry shared by the watcher and the exporter.
///
/// Cloning is cheap; every clone refers to the same collectors.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub watcher: WatcherMetrics,
}

impl MetricsRegistry {
    /// Creates a registry under the `wallet` namespace.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("wallet".to_string()), None)?;
        let watcher = WatcherMetrics::register(&registry)?;
        Ok(Self { registry, watcher })
    }

    /// Text exposition of everything registered; empty if encoding fails.
    pub fn gather_text(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!("failed to encode metrics: {e}");
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watcher_metrics_register_and_record() {
        let registry = Registry::new();
        let metrics = WatcherMetrics::register(&registry).expect("register metrics");

        metrics.polls_total.with_label_values(&[LOOP_ACCOUNT]).inc();
        metrics
            .poll_failures_total
            .with_label_values(&[LOOP_NETWORK])
            .inc();
        metrics.events_total.with_label_values(&["account"]).inc();
        metrics
            .poll_seconds
            .with_label_values(&[LOOP_PENDING])
            .observe(0.045);
        metrics.pending_transactions.set(3);

        assert_eq!(registry.gather().len(), 5);
        assert_eq!(
            metrics.polls_total.with_label_values(&[LOOP_ACCOUNT]).get(),
            1
        );
    }

    #[test]
    fn gathered_text_is_namespaced() {
        let registry = MetricsRegistry::new().expect("create metrics registry");
        registry
            .watcher
            .polls_total
            .with_label_values(&[LOOP_ACCOUNT])
            .inc();
        let text = registry.gather_text();
        assert!(text.contains("wallet_watcher_polls_total{loop=\"account\"} 1"));
    }
}
