//! RocksDB-backed pending-transaction store.
//!
//! Records live in a dedicated column family:
//!
//! - `"pending"`: maps the canonical transaction hash string -> JSON-encoded
//!   [`PendingTxRecord`].
//!
//! Records carry arbitrary JSON metadata, so JSON rather than a compact
//! binary encoding is used for values.

use std::collections::BTreeMap;
use std::path::Path;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};

use crate::pending::{PendingTransactionStore, StorageError};
use crate::types::{PendingTxRecord, TxHash};

const CF_PENDING: &str = "pending";

/// Configuration for [`RocksDbPendingStore`].
#[derive(Clone, Debug)]
pub struct RocksDbConfig {
    /// Filesystem path to the RocksDB database directory.
    pub path: String,
    /// Whether to create the database and missing column families if they
    /// do not yet exist.
    pub create_if_missing: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "data/pending-txs".to_string(),
            create_if_missing: true,
        }
    }
}

/// RocksDB-backed implementation of [`PendingTransactionStore`].
pub struct RocksDbPendingStore {
    db: DB,
}

impl RocksDbPendingStore {
    /// Opens (or creates) a store at the configured path.
    pub fn open(cfg: &RocksDbConfig) -> Result<Self, StorageError> {
        let path = Path::new(&cfg.path);

        let mut opts = Options::default();
        opts.create_if_missing(cfg.create_if_missing);
        opts.create_missing_column_families(cfg.create_if_missing);

        let cfs = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_PENDING, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self { db })
    }

    fn cf_pending(&self) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_PENDING)
            .ok_or(StorageError::MissingColumnFamily(CF_PENDING))
    }

    fn decode_entry(key: &[u8], value: &[u8]) -> Result<(TxHash, PendingTxRecord), StorageError> {
        let key = std::str::from_utf8(key)
            .map_err(|e| StorageError::Corrupted(format!("non-utf8 key: {e}")))?;
        let hash = TxHash::parse(key)
            .map_err(|e| StorageError::Corrupted(format!("key {key:?}: {e}")))?;
        let record = serde_json::from_slice(value)
            .map_err(|e| StorageError::Corrupted(format!("record for {key}: {e}")))?;
        Ok((hash, record))
    }
}

impl PendingTransactionStore for RocksDbPendingStore {
    fn transactions(&self) -> Result<BTreeMap<TxHash, PendingTxRecord>, StorageError> {
        let cf = self.cf_pending()?;
        let mut out = BTreeMap::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            match Self::decode_entry(&key, &value) {
                Ok((hash, record)) => {
                    out.insert(hash, record);
                }
                Err(e) => {
                    // One bad entry must not hide the rest of the list.
                    tracing::warn!("skipping pending transaction entry: {e}");
                }
            }
        }

        Ok(out)
    }

    fn add(&self, hash: TxHash, record: PendingTxRecord) -> Result<(), StorageError> {
        let cf = self.cf_pending()?;
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| StorageError::Corrupted(format!("failed to encode record: {e}")))?;
        self.db.put_cf(cf, hash.as_str().as_bytes(), bytes)?;
        Ok(())
    }

    fn remove(&self, hash: &TxHash) -> Result<bool, StorageError> {
        let cf = self.cf_pending()?;
        let key = hash.as_str().as_bytes();
        let existed = self.db.get_cf(cf, key)?.is_some();
        if existed {
            self.db.delete_cf(cf, key)?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TX_HASH_LEN;
    use tempfile::TempDir;

    fn dummy_hash(byte: u8) -> TxHash {
        TxHash::from_bytes([byte; TX_HASH_LEN])
    }

    fn open_temp() -> (TempDir, RocksDbPendingStore) {
        let tmp = TempDir::new().expect("create temp dir");
        let cfg = RocksDbConfig {
            path: tmp.path().to_string_lossy().to_string(),
            create_if_missing: true,
        };
        let store = RocksDbPendingStore::open(&cfg).expect("open RocksDB");
        (tmp, store)
    }

    #[test]
    fn rocksdb_store_roundtrip_records() {
        let (_tmp, store) = open_temp();

        let record = PendingTxRecord {
            submitted_at: 1_700_000_000,
            metadata: serde_json::json!({ "kind": "purchase", "product": "abc" }),
        };
        store.add(dummy_hash(7), record.clone()).unwrap();

        let txs = store.transactions().unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[&dummy_hash(7)], record);

        assert!(store.remove(&dummy_hash(7)).unwrap());
        assert!(!store.remove(&dummy_hash(7)).unwrap());
        assert!(store.transactions().unwrap().is_empty());
    }

    #[test]
    fn records_survive_reopen() {
        let tmp = TempDir::new().expect("create temp dir");
        let cfg = RocksDbConfig {
            path: tmp.path().to_string_lossy().to_string(),
            create_if_missing: true,
        };

        {
            let store = RocksDbPendingStore::open(&cfg).expect("open RocksDB");
            store
                .add(dummy_hash(1), PendingTxRecord::now(serde_json::Value::Null))
                .unwrap();
        }

        let store = RocksDbPendingStore::open(&cfg).expect("reopen RocksDB");
        assert!(store.transactions().unwrap().contains_key(&dummy_hash(1)));
    }

    #[test]
    fn corrupted_entries_are_skipped() {
        let (_tmp, store) = open_temp();
        store
            .add(dummy_hash(2), PendingTxRecord::now(serde_json::Value::Null))
            .unwrap();

        let cf = store.cf_pending().unwrap();
        store.db.put_cf(cf, b"not-a-hash", b"{}").unwrap();

        let txs = store.transactions().unwrap();
        assert_eq!(txs.len(), 1);
        assert!(txs.contains_key(&dummy_hash(2)));
    }
}
