use crate::core::PendingTransfer;
use crate::error::{LedgerError, Result};
use crate::identity::IdentityRegistry;
use crate::storage::{PendingPool, UTXOSet};
use log::info;

/// Where a transfer is headed once the receiver identifier is resolved.
///
/// Resolution consults the identity store, then the ledger; an identifier
/// matching neither is used as the address itself, which permits crediting
/// an address with no prior history.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferTarget {
    /// The identifier matched an identity or ledger entry.
    Known { name: String, address: String },
    /// No entry found; the identifier doubles as the address.
    Raw(String),
}

impl TransferTarget {
    pub fn resolve(
        identifier: &str,
        identities: &IdentityRegistry,
        utxo_set: &UTXOSet,
    ) -> Result<TransferTarget> {
        if let Some(identity) = identities.find(identifier)? {
            return Ok(TransferTarget::Known {
                name: identity.get_name().to_string(),
                address: identity.get_address().to_string(),
            });
        }

        if let Some(entry) = utxo_set.find_by_name(identifier)? {
            return Ok(TransferTarget::Known {
                name: entry.get_name().to_string(),
                address: entry.get_address().to_string(),
            });
        }

        Ok(TransferTarget::Raw(identifier.to_string()))
    }

    pub fn get_address(&self) -> &str {
        match self {
            TransferTarget::Known { address, .. } => address.as_str(),
            TransferTarget::Raw(address) => address.as_str(),
        }
    }

    pub fn get_name(&self) -> &str {
        match self {
            TransferTarget::Known { name, .. } => name.as_str(),
            TransferTarget::Raw(address) => address.as_str(),
        }
    }
}

/// Applies value transfers against the ledger and queues them for mining.
///
/// A transfer is a sequence of steps over independently persisted stores;
/// a failure leaves every store in the state reached by the last completed
/// step. There is no rollback. Transfers are also unauthenticated: the
/// identity store exists but no signature is demanded or checked here.
#[derive(Clone)]
pub struct Transfers {
    utxo_set: UTXOSet,
    identities: IdentityRegistry,
    pool: PendingPool,
}

impl Transfers {
    pub fn new(utxo_set: UTXOSet, identities: IdentityRegistry, pool: PendingPool) -> Transfers {
        Transfers {
            utxo_set,
            identities,
            pool,
        }
    }

    pub fn apply(&self, sender: &str, receiver: &str, amount: u64) -> Result<PendingTransfer> {
        self.apply_with_fee(sender, receiver, amount, None)
    }

    /// Validate and apply one transfer: debit the sender's denominations,
    /// credit the receiver, and append the record to the pending pool.
    pub fn apply_with_fee(
        &self,
        sender: &str,
        receiver: &str,
        amount: u64,
        fee: Option<u64>,
    ) -> Result<PendingTransfer> {
        if amount == 0 {
            return Err(LedgerError::Transaction(
                "Transfer amount must be positive".to_string(),
            ));
        }

        // The sender must already hold a ledger entry, found by name or by
        // address; a receiver-style raw-address fallback does not apply.
        let sender_entry = match self.utxo_set.find_by_name(sender)? {
            Some(entry) => entry,
            None => self
                .utxo_set
                .entry(sender)?
                .ok_or_else(|| LedgerError::NotFound(format!("Sender {sender} has no ledger entry")))?,
        };

        let available = sender_entry.total();
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let spent = self.utxo_set.spend(sender_entry.get_address(), amount)?;
        info!("Transfer from {sender} consumed denominations {spent:?}");

        let target = TransferTarget::resolve(receiver, &self.identities, &self.utxo_set)?;
        self.utxo_set
            .credit(target.get_address(), target.get_name(), amount)?;

        let record = PendingTransfer::new(sender, receiver, amount, fee)?;
        self.pool.add(record.clone())?;
        info!("Queued transfer of {amount} from {sender} to {receiver}");

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::storage::{MemoryStore, RecordStore};
    use std::sync::Arc;

    fn fixture() -> (Transfers, UTXOSet, PendingPool, Arc<MemoryStore<Identity>>) {
        let utxo_set = UTXOSet::new(Arc::new(MemoryStore::new()));
        let pool = PendingPool::new(Arc::new(MemoryStore::new()));
        let identity_store = Arc::new(MemoryStore::new());
        let identities = IdentityRegistry::new(identity_store.clone());
        let transfers = Transfers::new(utxo_set.clone(), identities, pool.clone());
        (transfers, utxo_set, pool, identity_store)
    }

    #[test]
    fn test_transfer_between_ledger_entries() {
        let (transfers, utxo_set, pool, _) = fixture();
        utxo_set.credit("addr-alice", "Alice", 50).unwrap();
        utxo_set.credit("addr-bob", "Bob", 20).unwrap();

        let record = transfers.apply("Alice", "Bob", 40).unwrap();
        assert_eq!(record.get_sender(), "Alice");
        assert_eq!(record.get_receiver(), "Bob");
        assert_eq!(record.get_amount(), 40);

        let alice = utxo_set.entry("addr-alice").unwrap().unwrap();
        assert_eq!(alice.get_amounts(), &[10]);
        let bob = utxo_set.entry("addr-bob").unwrap().unwrap();
        assert_eq!(bob.get_amounts(), &[20, 40]);

        let pending = pool.all().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0], record);
    }

    #[test]
    fn test_unknown_sender() {
        let (transfers, _, pool, _) = fixture();

        match transfers.apply("Mallory", "Bob", 5) {
            Err(LedgerError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(pool.is_empty().unwrap());
    }

    #[test]
    fn test_insufficient_funds_leaves_everything_untouched() {
        let (transfers, utxo_set, pool, _) = fixture();
        utxo_set.credit("addr-alice", "Alice", 30).unwrap();

        match transfers.apply("Alice", "Bob", 40) {
            Err(LedgerError::InsufficientFunds {
                required,
                available,
            }) => {
                assert_eq!(required, 40);
                assert_eq!(available, 30);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }

        let alice = utxo_set.entry("addr-alice").unwrap().unwrap();
        assert_eq!(alice.get_amounts(), &[30]);
        assert!(pool.is_empty().unwrap());
    }

    #[test]
    fn test_receiver_resolution_prefers_identity_store() {
        let (transfers, utxo_set, _, identity_store) = fixture();
        identity_store
            .save(&[Identity::new("Bob", "addr-bob")])
            .unwrap();
        utxo_set.credit("addr-alice", "Alice", 50).unwrap();

        transfers.apply("Alice", "Bob", 10).unwrap();

        let bob = utxo_set.entry("addr-bob").unwrap().unwrap();
        assert_eq!(bob.get_amounts(), &[10]);
        assert_eq!(bob.get_name(), "Bob");
    }

    #[test]
    fn test_unresolved_receiver_is_credited_as_raw_address() {
        let (transfers, utxo_set, _, _) = fixture();
        utxo_set.credit("addr-alice", "Alice", 50).unwrap();

        transfers.apply("Alice", "somewhere-without-history", 10).unwrap();

        let entry = utxo_set.entry("somewhere-without-history").unwrap().unwrap();
        assert_eq!(entry.get_amounts(), &[10]);
    }

    #[test]
    fn test_sender_found_by_address() {
        let (transfers, utxo_set, _, _) = fixture();
        utxo_set.credit("addr-alice", "Alice", 50).unwrap();

        transfers.apply("addr-alice", "Bob", 10).unwrap();
        assert_eq!(utxo_set.balance("addr-alice").unwrap(), 40);
    }

    #[test]
    fn test_fee_rides_along_without_being_debited() {
        let (transfers, utxo_set, pool, _) = fixture();
        utxo_set.credit("addr-alice", "Alice", 50).unwrap();

        transfers.apply_with_fee("Alice", "Bob", 40, Some(1)).unwrap();

        // The fee inflates the future miner reward; the sender is only
        // debited the transfer amount.
        assert_eq!(utxo_set.balance("addr-alice").unwrap(), 10);
        assert_eq!(pool.all().unwrap()[0].get_fee(), 1);
    }
}
