//! JSON-RPC over HTTP wallet provider.
//!
//! This implementation of [`crate::provider::WalletProvider`] talks to an
//! Ethereum node (or a wallet's RPC endpoint) using the standard JSON-RPC
//! methods:
//!
//! ```json
//! POST /
//! { "jsonrpc": "2.0", "id": 7, "method": "eth_accounts", "params": [] }
//!
//! Response:
//! { "jsonrpc": "2.0", "id": 7, "result": ["0x5aae...beaed"] }
//! ```
//!
//! | operation                   | method                      |
//! |-----------------------------|-----------------------------|
//! | `default_account`           | `eth_accounts`              |
//! | `chain_id`                  | `eth_chainId`               |
//! | `has_transaction_completed` | `eth_getTransactionByHash`  |
//! | `transaction_receipt`       | `eth_getTransactionReceipt` |
//!
//! Transaction lookups can be routed to a per-chain endpoint; chains without
//! a dedicated endpoint use the main one.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::provider::{ProviderError, WalletProvider};
use crate::types::{Address, ChainId, Receipt, TxHash};

/// HTTP-based wallet provider.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections.
pub struct HttpWalletProvider {
    base_url: String,
    chain_urls: BTreeMap<ChainId, String>,
    client: Client,
    next_id: AtomicU64,
}

impl HttpWalletProvider {
    /// Constructs a provider pointing at `base_url`.
    ///
    /// An empty `base_url` yields a provider that reports
    /// [`ProviderError::NotSupported`] for every call.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            chain_urls: BTreeMap::new(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Builds a provider from [`ProviderConfig`], including per-chain URLs.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut provider = Self::new(cfg.rpc_url.clone(), cfg.timeout)?;
        provider.chain_urls = cfg.chain_rpc_urls.clone();
        Ok(provider)
    }

    /// Routes transaction lookups for `chain` to `url`.
    pub fn with_chain_url(mut self, chain: ChainId, url: impl Into<String>) -> Self {
        self.chain_urls.insert(chain, url.into());
        self
    }

    fn url_for(&self, chain: Option<&ChainId>) -> &str {
        chain
            .and_then(|c| self.chain_urls.get(c))
            .map(String::as_str)
            .unwrap_or(&self.base_url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        method: &'static str,
        params: Value,
    ) -> Result<T, ProviderError> {
        if url.is_empty() {
            return Err(ProviderError::NotSupported);
        }

        let req_body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let resp = self
            .client
            .post(url)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("HTTP POST {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "{method}: node returned HTTP status {status}"
            )));
        }

        let body = resp
            .json::<RpcResponse>()
            .await
            .map_err(|e| ProviderError::Protocol(format!("{method}: invalid JSON response: {e}")))?;

        decode_result(method, body)
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Receipt as returned by `eth_getTransactionReceipt`; quantities are hex.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    block_hash: Option<String>,
    gas_used: Option<String>,
    status: Option<String>,
}

/// Subset of `eth_getTransactionByHash` needed to tell whether it was mined.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    block_number: Option<String>,
}

fn decode_result<T: DeserializeOwned>(
    method: &'static str,
    body: RpcResponse,
) -> Result<T, ProviderError> {
    if let Some(err) = body.error {
        return Err(ProviderError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    let result = body.result.unwrap_or(Value::Null);
    serde_json::from_value(result)
        .map_err(|e| ProviderError::Protocol(format!("{method}: unexpected result: {e}")))
}

fn parse_quantity(field: &'static str, s: &str) -> Result<u64, ProviderError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map_err(|_| ProviderError::Protocol(format!("invalid {field} quantity: {s:?}")))
}

fn first_account(accounts: Vec<String>) -> Result<Address, ProviderError> {
    let first = accounts.into_iter().next().ok_or(ProviderError::WalletLocked)?;
    Address::parse(&first)
        .map_err(|e| ProviderError::Protocol(format!("invalid account {first:?}: {e}")))
}

fn convert_receipt(raw: RpcReceipt) -> Result<Receipt, ProviderError> {
    let transaction_hash = TxHash::parse(&raw.transaction_hash)
        .map_err(|e| ProviderError::Protocol(format!("invalid receipt hash: {e}")))?;
    let block_number = raw
        .block_number
        .as_deref()
        .map(|s| parse_quantity("blockNumber", s))
        .transpose()?;
    let gas_used = raw
        .gas_used
        .as_deref()
        .map(|s| parse_quantity("gasUsed", s))
        .transpose()?;
    // Pre-Byzantium receipts carry no status; those never revert observably.
    let status = match raw.status.as_deref() {
        None => true,
        Some(s) => parse_quantity("status", s)? == 1,
    };

    Ok(Receipt {
        transaction_hash,
        block_number,
        block_hash: raw.block_hash,
        gas_used,
        status,
    })
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    fn has_provider(&self) -> bool {
        !self.base_url.is_empty()
    }

    async fn default_account(&self) -> Result<Address, ProviderError> {
        let accounts: Vec<String> = self
            .call(&self.base_url, "eth_accounts", Value::Array(Vec::new()))
            .await?;
        first_account(accounts)
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        let raw: String = self
            .call(&self.base_url, "eth_chainId", Value::Array(Vec::new()))
            .await?;
        ChainId::parse(&raw).map_err(|e| ProviderError::Protocol(format!("eth_chainId: {e}")))
    }

    async fn has_transaction_completed(
        &self,
        hash: &TxHash,
        chain: &ChainId,
    ) -> Result<bool, ProviderError> {
        let url = self.url_for(Some(chain));
        let tx: Option<RpcTransaction> = self
            .call(
                url,
                "eth_getTransactionByHash",
                serde_json::json!([hash.as_str()]),
            )
            .await?;
        Ok(tx.is_some_and(|t| t.block_number.is_some()))
    }

    async fn transaction_receipt(
        &self,
        hash: &TxHash,
        chain: &ChainId,
    ) -> Result<Option<Receipt>, ProviderError> {
        let url = self.url_for(Some(chain));
        let raw: Option<RpcReceipt> = self
            .call(
                url,
                "eth_getTransactionReceipt",
                serde_json::json!([hash.as_str()]),
            )
            .await?;
        raw.map(convert_receipt).transpose()
    }
}
