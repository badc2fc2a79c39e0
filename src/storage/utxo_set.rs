use crate::error::{LedgerError, Result};
use crate::storage::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// One ledger entry: an address and its unspent denominations.
///
/// The address is the authoritative key; the name is a display label. The
/// spendable balance is the sum of the denominations. Entries with an empty
/// denomination list are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    name: String,
    address: String,
    amounts: Vec<u64>,
}

impl UtxoEntry {
    pub fn get_name(&self) -> &str {
        self.name.as_str()
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_amounts(&self) -> &[u64] {
        self.amounts.as_slice()
    }

    pub fn total(&self) -> u64 {
        self.amounts.iter().sum()
    }
}

/// The UTXO ledger over an injected record store.
///
/// Every operation is one full load / mutate / full persist cycle, run under
/// a per-store lock so concurrent callers in the same process cannot lose
/// updates. Cross-process writers are still outside the contract.
#[derive(Clone)]
pub struct UTXOSet {
    store: Arc<dyn RecordStore<UtxoEntry>>,
    write_lock: Arc<Mutex<()>>,
}

impl UTXOSet {
    pub fn new(store: Arc<dyn RecordStore<UtxoEntry>>) -> UTXOSet {
        UTXOSet {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Append a denomination to an address, creating the entry on first
    /// credit. Crediting twice credits twice; there is no deduplication.
    pub fn credit(&self, address: &str, name: &str, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(LedgerError::Transaction(
                "Credit amount must be positive".to_string(),
            ));
        }

        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire UTXO write lock - this should never happen");

        let mut entries = self.store.load()?;
        match entries.iter_mut().find(|e| e.address == address) {
            Some(entry) => entry.amounts.push(amount),
            None => entries.push(UtxoEntry {
                name: name.to_string(),
                address: address.to_string(),
                amounts: vec![amount],
            }),
        }
        self.store.save(&entries)
    }

    /// Spend `amount_needed` from an address, greedily consuming the largest
    /// denominations first and re-crediting any excess as change.
    ///
    /// Returns the denominations consumed. On insufficient funds (including
    /// an unknown address) nothing is mutated.
    pub fn spend(&self, address: &str, amount_needed: u64) -> Result<Vec<u64>> {
        if amount_needed == 0 {
            return Err(LedgerError::Transaction(
                "Spend amount must be positive".to_string(),
            ));
        }

        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire UTXO write lock - this should never happen");

        let mut entries = self.store.load()?;
        let position = match entries.iter().position(|e| e.address == address) {
            Some(position) => position,
            None => {
                return Err(LedgerError::InsufficientFunds {
                    required: amount_needed,
                    available: 0,
                })
            }
        };

        let entry = &mut entries[position];
        let available = entry.total();
        if available < amount_needed {
            return Err(LedgerError::InsufficientFunds {
                required: amount_needed,
                available,
            });
        }

        // Largest-first greedy selection. The sort is stable and descending,
        // so ties break deterministically for a given stored order.
        let mut sorted = entry.amounts.clone();
        sorted.sort_by(|a, b| b.cmp(a));

        let mut selected = Vec::new();
        let mut accumulated = 0u64;
        for amount in sorted {
            selected.push(amount);
            accumulated += amount;
            if accumulated >= amount_needed {
                break;
            }
        }

        // Remove exactly the selected denominations, one occurrence each.
        for amount in &selected {
            let idx = entry
                .amounts
                .iter()
                .position(|a| a == amount)
                .expect("selected denominations come from this entry");
            entry.amounts.remove(idx);
        }

        let change = accumulated - amount_needed;
        if change > 0 {
            entry.amounts.push(change);
        }
        if entry.amounts.is_empty() {
            entries.remove(position);
        }

        self.store.save(&entries)?;
        Ok(selected)
    }

    /// Remove one denomination matching `amount` from an address. Returns
    /// whether a denomination was removed; the entry is deleted when its
    /// denomination list becomes empty.
    pub fn remove_amount(&self, address: &str, amount: u64) -> Result<bool> {
        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire UTXO write lock - this should never happen");

        let mut entries = self.store.load()?;
        let position = match entries.iter().position(|e| e.address == address) {
            Some(position) => position,
            None => return Ok(false),
        };

        let entry = &mut entries[position];
        let idx = match entry.amounts.iter().position(|a| *a == amount) {
            Some(idx) => idx,
            None => return Ok(false),
        };

        entry.amounts.remove(idx);
        if entry.amounts.is_empty() {
            entries.remove(position);
        }

        self.store.save(&entries)?;
        Ok(true)
    }

    /// Replace an address's denominations with their sum. A no-op for
    /// unknown addresses. Preserves total value exactly.
    pub fn consolidate(&self, address: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire UTXO write lock - this should never happen");

        let mut entries = self.store.load()?;
        let position = match entries.iter().position(|e| e.address == address) {
            Some(position) => position,
            None => return Ok(()),
        };

        let total = entries[position].total();
        if total == 0 {
            entries.remove(position);
        } else {
            entries[position].amounts = vec![total];
        }
        self.store.save(&entries)
    }

    /// Consolidate every entry in one pass.
    pub fn consolidate_all(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire UTXO write lock - this should never happen");

        let mut entries = self.store.load()?;
        for entry in entries.iter_mut() {
            entry.amounts = vec![entry.total()];
        }
        entries.retain(|e| e.total() > 0);
        self.store.save(&entries)
    }

    /// Spendable balance for an address; zero when no entry exists.
    pub fn balance(&self, address: &str) -> Result<u64> {
        Ok(self.entry(address)?.map(|e| e.total()).unwrap_or(0))
    }

    pub fn entry(&self, address: &str) -> Result<Option<UtxoEntry>> {
        let entries = self.store.load()?;
        Ok(entries.into_iter().find(|e| e.address == address))
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<UtxoEntry>> {
        let entries = self.store.load()?;
        Ok(entries.into_iter().find(|e| e.name == name))
    }

    pub fn entries(&self) -> Result<Vec<UtxoEntry>> {
        self.store.load()
    }
}
