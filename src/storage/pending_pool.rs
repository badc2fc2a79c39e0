use crate::core::PendingTransfer;
use crate::error::Result;
use crate::storage::RecordStore;
use std::sync::{Arc, Mutex};

/// The persisted queue of transfers waiting to be mined.
///
/// Ordered; transfers are appended as they are applied and the whole queue
/// is cleared once a mining operation consumes it.
#[derive(Clone)]
pub struct PendingPool {
    store: Arc<dyn RecordStore<PendingTransfer>>,
    write_lock: Arc<Mutex<()>>,
}

impl PendingPool {
    pub fn new(store: Arc<dyn RecordStore<PendingTransfer>>) -> PendingPool {
        PendingPool {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn add(&self, transfer: PendingTransfer) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire pending pool lock - this should never happen");

        let mut transfers = self.store.load()?;
        transfers.push(transfer);
        self.store.save(&transfers)
    }

    pub fn all(&self) -> Result<Vec<PendingTransfer>> {
        self.store.load()
    }

    pub fn clear(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire pending pool lock - this should never happen");

        self.store.save(&[])
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.store.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.store.load()?.is_empty())
    }
}
