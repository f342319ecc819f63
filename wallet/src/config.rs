//! Top-level configuration for a wallet-watching service.
//!
//! This module aggregates configuration for:
//!
//! - watcher polling intervals (`WatcherConfig`),
//! - the wallet provider endpoint (RPC URL, timeout, per-chain URLs),
//! - the durable pending-transaction store (RocksDB path),
//! - the metrics exporter (enable flag + listen address).
//!
//! `WalletConfig::default()` gives a working local setup; `from_env`
//! layers `WALLET_*` environment variables on top of it.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::pending::RocksDbConfig;
use crate::types::ChainId;
use crate::watcher::WatcherConfig;

/// Errors produced while reading configuration overrides.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the wallet provider client.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// JSON-RPC endpoint of the wallet / node, e.g. `"http://127.0.0.1:8545"`.
    pub rpc_url: String,
    /// Request timeout for provider calls.
    pub timeout: Duration,
    /// JSON-RPC endpoints used for transaction lookups on specific chains.
    pub chain_rpc_urls: BTreeMap<ChainId, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            timeout: Duration::from_secs(20),
            chain_rpc_urls: BTreeMap::new(),
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 9898)),
        }
    }
}

/// Top-level configuration for a wallet-watching service.
#[derive(Clone, Debug, Default)]
pub struct WalletConfig {
    pub watcher: WatcherConfig,
    pub provider: ProviderConfig,
    pub pending_store: RocksDbConfig,
    pub metrics: MetricsConfig,
}

impl WalletConfig {
    /// Defaults overridden by `WALLET_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    ///
    /// Recognised keys:
    ///
    /// - `WALLET_RPC_URL`
    /// - `WALLET_RPC_TIMEOUT_MS`
    /// - `WALLET_CHAIN_RPC_URLS` (`"137=https://polygon,100=https://gnosis"`)
    /// - `WALLET_ACCOUNT_POLL_MS`, `WALLET_NETWORK_POLL_MS`,
    ///   `WALLET_PENDING_POLL_MS`
    /// - `WALLET_PENDING_DB`
    /// - `WALLET_METRICS_ENABLED`, `WALLET_METRICS_ADDR`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("WALLET_RPC_URL") {
            cfg.provider.rpc_url = url;
        }
        if let Some(v) = lookup("WALLET_RPC_TIMEOUT_MS") {
            cfg.provider.timeout = parse_millis("WALLET_RPC_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("WALLET_CHAIN_RPC_URLS") {
            cfg.provider.chain_rpc_urls = parse_chain_urls(&v)?;
        }
        if let Some(v) = lookup("WALLET_ACCOUNT_POLL_MS") {
            cfg.watcher.account_poll_interval = parse_millis("WALLET_ACCOUNT_POLL_MS", &v)?;
        }
        if let Some(v) = lookup("WALLET_NETWORK_POLL_MS") {
            cfg.watcher.network_poll_interval = parse_millis("WALLET_NETWORK_POLL_MS", &v)?;
        }
        if let Some(v) = lookup("WALLET_PENDING_POLL_MS") {
            cfg.watcher.pending_tx_poll_interval = parse_millis("WALLET_PENDING_POLL_MS", &v)?;
        }
        if let Some(path) = lookup("WALLET_PENDING_DB") {
            cfg.pending_store.path = path;
        }
        if let Some(v) = lookup("WALLET_METRICS_ENABLED") {
            cfg.metrics.enabled = parse_bool("WALLET_METRICS_ENABLED", &v)?;
        }
        if let Some(v) = lookup("WALLET_METRICS_ADDR") {
            cfg.metrics.listen_addr = v.parse().map_err(|e| ConfigError::Invalid {
                key: "WALLET_METRICS_ADDR",
                value: v.clone(),
                reason: format!("{e}"),
            })?;
        }

        Ok(cfg)
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let ms: u64 = value.trim().parse().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: format!("{e}"),
    })?;
    if ms == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_millis(ms))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_chain_urls(value: &str) -> Result<BTreeMap<ChainId, String>, ConfigError> {
    let mut out = BTreeMap::new();
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((chain, url)) = entry.split_once('=') else {
            return Err(ConfigError::Invalid {
                key: "WALLET_CHAIN_RPC_URLS",
                value: value.to_string(),
                reason: format!("entry {entry:?} is not chain=url"),
            });
        };
        let chain = ChainId::parse(chain).map_err(|e| ConfigError::Invalid {
            key: "WALLET_CHAIN_RPC_URLS",
            value: value.to_string(),
            reason: format!("{e}"),
        })?;
        out.insert(chain, url.trim().to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_documented_intervals() {
        let cfg = WalletConfig::default();
        assert_eq!(cfg.watcher.account_poll_interval, Duration::from_secs(1));
        assert_eq!(cfg.watcher.network_poll_interval, Duration::from_secs(1));
        assert_eq!(cfg.watcher.pending_tx_poll_interval, Duration::from_secs(5));
        assert!(cfg.metrics.enabled);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = WalletConfig::from_lookup(lookup_from(&[
            ("WALLET_RPC_URL", "http://node:8545"),
            ("WALLET_RPC_TIMEOUT_MS", "1500"),
            ("WALLET_CHAIN_RPC_URLS", "137=https://polygon, 100=https://gnosis"),
            ("WALLET_PENDING_POLL_MS", "250"),
            ("WALLET_PENDING_DB", "/tmp/pending"),
            ("WALLET_METRICS_ENABLED", "off"),
            ("WALLET_METRICS_ADDR", "0.0.0.0:9000"),
        ]))
        .expect("valid overrides");

        assert_eq!(cfg.provider.rpc_url, "http://node:8545");
        assert_eq!(cfg.provider.timeout, Duration::from_millis(1500));
        assert_eq!(cfg.provider.chain_rpc_urls[&ChainId::from(137)], "https://polygon");
        assert_eq!(cfg.provider.chain_rpc_urls[&ChainId::from(100)], "https://gnosis");
        assert_eq!(cfg.watcher.pending_tx_poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.pending_store.path, "/tmp/pending");
        assert!(!cfg.metrics.enabled);
        assert_eq!(cfg.metrics.listen_addr.port(), 9000);
    }

    #[test]
    fn invalid_values_are_reported_with_their_key() {
        let err = WalletConfig::from_lookup(lookup_from(&[("WALLET_NETWORK_POLL_MS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WALLET_NETWORK_POLL_MS", .. }));

        let err = WalletConfig::from_lookup(lookup_from(&[("WALLET_CHAIN_RPC_URLS", "137")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WALLET_CHAIN_RPC_URLS", .. }));

        let err = WalletConfig::from_lookup(lookup_from(&[("WALLET_CHAIN_RPC_URLS", "eth=http://x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WALLET_CHAIN_RPC_URLS", .. }));

        let err = WalletConfig::from_lookup(lookup_from(&[("WALLET_METRICS_ENABLED", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WALLET_METRICS_ENABLED", .. }));
    }
}
