use crate::error::{LedgerError, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::RwLock;

const RECORDS_KEY: &str = "records";

/// Whole-record-set persistence.
///
/// Every logical store (chain, ledger, pending pool, identities) is read and
/// replaced as a unit: `load` returns the full current record set and `save`
/// atomically replaces it. There is no partial or streaming access.
pub trait RecordStore<T>: Send + Sync {
    /// Load the full record set. Absent or unparsable data yields an empty
    /// set rather than an error.
    fn load(&self) -> Result<Vec<T>>;

    /// Atomically replace the full record set.
    fn save(&self, records: &[T]) -> Result<()>;
}

/// Record store backed by one sled tree.
///
/// The whole record set lives JSON-encoded under a single key, so a `save`
/// is a single atomic insert.
pub struct SledStore<T> {
    tree: sled::Tree,
    name: String,
    _records: PhantomData<fn() -> T>,
}

impl<T> SledStore<T> {
    pub fn open(db: &sled::Db, name: &str) -> Result<SledStore<T>> {
        let tree = db
            .open_tree(name)
            .map_err(|e| LedgerError::Database(format!("Failed to open tree {name}: {e}")))?;
        Ok(SledStore {
            tree,
            name: name.to_string(),
            _records: PhantomData,
        })
    }
}

impl<T> RecordStore<T> for SledStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Result<Vec<T>> {
        let bytes = self
            .tree
            .get(RECORDS_KEY)
            .map_err(|e| LedgerError::Database(format!("Failed to read store {}: {e}", self.name)))?;

        match bytes {
            None => Ok(Vec::new()),
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(records) => Ok(records),
                Err(e) => {
                    // Corrupt data degrades to an empty set instead of failing.
                    warn!("Store {} holds unparsable data, treating as empty: {e}", self.name);
                    Ok(Vec::new())
                }
            },
        }
    }

    fn save(&self, records: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec(records).map_err(|e| {
            LedgerError::Serialization(format!("Failed to encode store {}: {e}", self.name))
        })?;
        self.tree
            .insert(RECORDS_KEY, bytes)
            .map_err(|e| LedgerError::Database(format!("Failed to write store {}: {e}", self.name)))?;
        self.tree
            .flush()
            .map_err(|e| LedgerError::Database(format!("Failed to flush store {}: {e}", self.name)))?;
        Ok(())
    }
}

/// In-memory record store for tests and ephemeral setups.
pub struct MemoryStore<T> {
    inner: RwLock<Vec<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> MemoryStore<T> {
        MemoryStore {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    fn load(&self) -> Result<Vec<T>> {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on memory store - this should never happen");
        Ok(inner.clone())
    }

    fn save(&self, records: &[T]) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on memory store - this should never happen");
        *inner = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sled_store_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        let store: SledStore<Vec<u64>> = SledStore::open(&db, "test").unwrap();

        assert!(store.load().unwrap().is_empty());

        let records = vec![vec![1, 2], vec![3]];
        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);

        // A save fully replaces the previous record set
        store.save(&[vec![9]]).unwrap();
        assert_eq!(store.load().unwrap(), vec![vec![9]]);
    }

    #[test]
    fn test_sled_store_corrupt_data_degrades_to_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();

        let tree = db.open_tree("test").unwrap();
        tree.insert(RECORDS_KEY, &b"definitely not json"[..]).unwrap();

        let store: SledStore<Vec<u64>> = SledStore::open(&db, "test").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store: MemoryStore<u64> = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());

        store.save(&[7, 8, 9]).unwrap();
        assert_eq!(store.load().unwrap(), vec![7, 8, 9]);

        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
