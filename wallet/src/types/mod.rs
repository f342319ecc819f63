//! Core domain types used by the wallet watcher
//!
//! This module defines strongly-typed addresses, chain identifiers and
//! transaction hashes shared by the provider, the pending-transaction
//! store and the watcher. The goal is to avoid "naked" strings in public
//! APIs: every value is validated and canonicalised once, on construction,
//! so that equality checks elsewhere can be plain `==`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Receipts of mined transactions.
pub mod receipt;
/// Locally tracked, not-yet-mined transactions.
pub mod tx;

pub use receipt::Receipt;
pub use tx::PendingTxRecord;

/// Length in bytes of an Ethereum account address.
pub const ADDRESS_LEN: usize = 20;

/// Length in bytes of a transaction hash.
pub const TX_HASH_LEN: usize = 32;

/// Errors produced when parsing the string forms of the types below.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid chain id: {0:?}")]
    InvalidChainId(String),
}

fn decode_prefixed_hex(s: &str, expected: usize) -> Result<Vec<u8>, ParseError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != expected {
        return Err(ParseError::InvalidLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Ethereum account address.
///
/// Stored in canonical form (`0x` + 40 lowercase hex digits), so two
/// addresses that differ only in checksum casing compare equal.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parses and canonicalises an address string.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let bytes = decode_prefixed_hex(s, ADDRESS_LEN)?;
        Ok(Address(format!("0x{}", hex::encode(bytes))))
    }

    /// Returns the canonical `0x`-prefixed lowercase form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chain / network identifier, kept as a decimal string.
///
/// Providers report chain ids either as decimal numbers (`net_version`) or
/// as `0x`-prefixed quantities (`eth_chainId`); both normalise to the same
/// decimal form here.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

impl ChainId {
    /// Parses a decimal or `0x`-prefixed hexadecimal chain id.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let trimmed = s.trim();
        let value = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(digits) => u64::from_str_radix(digits, 16),
            None => trimmed.parse::<u64>(),
        }
        .map_err(|_| ParseError::InvalidChainId(s.to_string()))?;
        Ok(ChainId::from(value))
    }

    /// Returns the decimal string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ChainId {
    fn from(v: u64) -> Self {
        ChainId(v.to_string())
    }
}

impl FromStr for ChainId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainId::parse(s)
    }
}

impl TryFrom<String> for ChainId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ChainId::parse(&s)
    }
}

impl From<ChainId> for String {
    fn from(c: ChainId) -> Self {
        c.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 32-byte transaction hash in canonical `0x`-prefixed lowercase form.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    /// Parses and canonicalises a transaction hash.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let bytes = decode_prefixed_hex(s, TX_HASH_LEN)?;
        Ok(TxHash(format!("0x{}", hex::encode(bytes))))
    }

    /// Builds a hash from raw bytes.
    pub fn from_bytes(bytes: [u8; TX_HASH_LEN]) -> Self {
        TxHash(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxHash::parse(s)
    }
}

impl TryFrom<String> for TxHash {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        TxHash::parse(&s)
    }
}

impl From<TxHash> for String {
    fn from(h: TxHash) -> Self {
        h.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn address_is_canonicalised_to_lowercase() {
        let a = Address::parse(CHECKSUMMED).expect("valid address");
        assert_eq!(a.as_str(), "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
        assert_eq!(a, Address::parse(&CHECKSUMMED.to_lowercase()).unwrap());
    }

    #[test]
    fn address_rejects_wrong_length_and_bad_hex() {
        assert_eq!(
            Address::parse("0x1234"),
            Err(ParseError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: 2
            })
        );
        assert!(matches!(
            Address::parse("0xzz"),
            Err(ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn checksum_casing_does_not_affect_equality() {
        let upper = CHECKSUMMED.to_uppercase().replacen("0X", "0x", 1);
        assert_eq!(Address::parse(CHECKSUMMED).unwrap(), Address::parse(&upper).unwrap());
        assert_ne!(
            Address::parse(CHECKSUMMED).unwrap(),
            Address::parse("0x0000000000000000000000000000000000000001").unwrap()
        );
    }

    #[test]
    fn chain_id_accepts_decimal_and_hex() {
        assert_eq!(ChainId::parse("137").unwrap().as_str(), "137");
        assert_eq!(ChainId::parse("0x89").unwrap().as_str(), "137");
        assert_eq!(ChainId::parse("0x89").unwrap(), ChainId::from(137));
        assert!(ChainId::parse("").is_err());
        assert!(ChainId::parse("mainnet").is_err());
    }

    #[test]
    fn tx_hash_serde_uses_canonical_string() {
        let raw = format!("0x{}", "AB".repeat(TX_HASH_LEN));
        let hash = TxHash::parse(&raw).unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(TX_HASH_LEN)));

        let back: TxHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert!(serde_json::from_str::<TxHash>("\"0x01\"").is_err());
    }
}
