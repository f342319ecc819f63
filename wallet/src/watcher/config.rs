use std::time::Duration;

/// Polling intervals for the wallet watcher.
///
/// Each loop sleeps for its interval after a tick settles, so ticks of the
/// same loop never overlap. The network interval doubles as the deadline
/// for a single chain-id read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Delay between active-account reads.
    pub account_poll_interval: Duration,
    /// Delay between chain-id reads, and the deadline of each read.
    pub network_poll_interval: Duration,
    /// Delay between pending-transaction sweeps.
    pub pending_tx_poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            account_poll_interval: Duration::from_millis(1000),
            network_poll_interval: Duration::from_millis(1000),
            pending_tx_poll_interval: Duration::from_millis(5000),
        }
    }
}
