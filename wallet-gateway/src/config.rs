//! Wallet gateway configuration.
//!
//! Only the HTTP listen address lives here. Everything the watcher needs is
//! taken from `wallet::WalletConfig::from_env()`.

use std::net::SocketAddr;

use wallet::ConfigError;

/// Configuration for the gateway HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        // Bind to all interfaces so a container port mapping is reachable.
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `GATEWAY_LISTEN_ADDR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("GATEWAY_LISTEN_ADDR") {
            cfg.listen_addr = v.parse().map_err(|e| ConfigError::Invalid {
                key: "GATEWAY_LISTEN_ADDR",
                value: v.clone(),
                reason: format!("{e}"),
            })?;
        }
        Ok(cfg)
    }
}
