//! Wallet provider abstraction.
//!
//! The watcher never talks to a wallet directly; it goes through the
//! [`WalletProvider`] trait so that tests can script responses and nodes
//! can swap transports. [`HttpWalletProvider`] is the JSON-RPC over HTTP
//! implementation used by the gateway.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Address, ChainId, Receipt, TxHash};

pub use http::HttpWalletProvider;

/// Errors that can occur while reading from the wallet provider.
///
/// All of these are treated as transient by the watcher: they are logged,
/// possibly surfaced as an `*_ERROR` event, and the read is retried on the
/// next tick.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// No wallet provider is available at all.
    #[error("wallet provider not supported")]
    NotSupported,
    /// A provider exists but access to it has not been granted.
    #[error("wallet provider not enabled")]
    NotEnabled,
    /// The provider is reachable but exposes no accounts.
    #[error("wallet is locked")]
    WalletLocked,
    /// Transport-level error (connection refused, HTTP failure, timeout).
    #[error("transport error: {0}")]
    Transport(String),
    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    /// The node returned a malformed or unexpected response.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Read-only view of a wallet and the chains it can reach.
///
/// Implementations must be cheap to call repeatedly; the watcher polls them
/// every second.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Returns `true` once the wallet provider is present and usable.
    ///
    /// Account events are held back while this is `false` so that listeners
    /// do not see an account before the user approved access.
    fn has_provider(&self) -> bool;

    /// Returns the active (first) wallet account.
    async fn default_account(&self) -> Result<Address, ProviderError>;

    /// Returns the chain currently selected in the wallet.
    async fn chain_id(&self) -> Result<ChainId, ProviderError>;

    /// Returns `true` if the transaction has been included in a block.
    async fn has_transaction_completed(
        &self,
        hash: &TxHash,
        chain: &ChainId,
    ) -> Result<bool, ProviderError>;

    /// Returns the receipt of a mined transaction, if the node has one.
    async fn transaction_receipt(
        &self,
        hash: &TxHash,
        chain: &ChainId,
    ) -> Result<Option<Receipt>, ProviderError>;
}
