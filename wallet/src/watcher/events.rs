//! Events emitted by the wallet watcher.

use std::fmt;

use crate::provider::ProviderError;
use crate::types::{Address, ChainId, Receipt, TxHash};

use super::error::TransactionError;

/// Kinds of events listeners can subscribe to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Account,
    AccountError,
    Network,
    NetworkError,
    TransactionComplete,
    TransactionError,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Account,
        EventKind::AccountError,
        EventKind::Network,
        EventKind::NetworkError,
        EventKind::TransactionComplete,
        EventKind::TransactionError,
    ];

    /// Stable snake_case name, used for logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Account => "account",
            EventKind::AccountError => "account_error",
            EventKind::Network => "network",
            EventKind::NetworkError => "network_error",
            EventKind::TransactionComplete => "transaction_complete",
            EventKind::TransactionError => "transaction_error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event together with its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum WalletEvent {
    /// The active account became known or changed.
    ///
    /// Always carries an account: a lost or locked account is reported
    /// as [`WalletEvent::AccountError`], never as an "account cleared" event.
    Account(Address),
    /// A previously known account could no longer be read (wallet locked).
    AccountError(ProviderError),
    /// The selected chain became known or changed.
    Network(ChainId),
    /// A previously known chain could no longer be read.
    NetworkError(ProviderError),
    /// A tracked transaction was mined and succeeded.
    TransactionComplete { hash: TxHash, receipt: Receipt },
    /// A tracked transaction was mined but reverted.
    TransactionError {
        hash: TxHash,
        error: TransactionError,
    },
}

impl WalletEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WalletEvent::Account(_) => EventKind::Account,
            WalletEvent::AccountError(_) => EventKind::AccountError,
            WalletEvent::Network(_) => EventKind::Network,
            WalletEvent::NetworkError(_) => EventKind::NetworkError,
            WalletEvent::TransactionComplete { .. } => EventKind::TransactionComplete,
            WalletEvent::TransactionError { .. } => EventKind::TransactionError,
        }
    }
}
