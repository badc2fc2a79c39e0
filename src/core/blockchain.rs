// This is the chain itself: an ordered sequence of mined blocks over an
// injected block store. The full sequence is held in memory and persisted
// as a whole on every append, matching the load-all/replace-all contract
// of the backing stores.

use crate::config::Settings;
use crate::core::{Block, PendingTransfer, ProofOfWork, Transaction, GENESIS_PREVIOUS_HASH};
use crate::error::{LedgerError, Result};
use crate::storage::{RecordStore, UTXOSet};
use log::{info, warn};
use std::sync::{Arc, Mutex, RwLock};

#[derive(Clone)]
pub struct Blockchain {
    blocks: Arc<RwLock<Vec<Block>>>,
    store: Arc<dyn RecordStore<Block>>,
    write_lock: Arc<Mutex<()>>,
    difficulty: u32,
    base_reward: u64,
}

impl Blockchain {
    /// Open the chain from its store, mining and persisting the genesis
    /// block (one premine coinbase) when no chain exists yet.
    pub fn initialize(store: Arc<dyn RecordStore<Block>>, settings: &Settings) -> Result<Blockchain> {
        let mut blocks = store.load()?;

        if blocks.is_empty() {
            info!(
                "No chain found, mining genesis block with premine for {}",
                settings.premine_recipient
            );
            let premine =
                Transaction::premine(&settings.premine_recipient, settings.premine_amount)?;
            let genesis = Block::new_block(
                0,
                vec![premine],
                GENESIS_PREVIOUS_HASH.to_string(),
                settings.difficulty,
            )?;
            blocks.push(genesis);
            store.save(&blocks)?;
        }

        Ok(Blockchain {
            blocks: Arc::new(RwLock::new(blocks)),
            store,
            write_lock: Arc::new(Mutex::new(())),
            difficulty: settings.difficulty,
            base_reward: settings.base_reward,
        })
    }

    /// Mine the given transfers into a new block chained to the tip.
    ///
    /// The reward transaction (base reward plus collected fees, paid to the
    /// miner's name) always comes first in the block. The reward is credited
    /// to `miner_address` in the ledger; with no address the block still
    /// stands but the reward is never credited anywhere, which is logged.
    pub fn append_block(
        &self,
        transfers: &[PendingTransfer],
        miner_name: &str,
        miner_address: Option<&str>,
        utxo_set: &UTXOSet,
    ) -> Result<Block> {
        let _guard = self
            .write_lock
            .lock()
            .expect("Failed to acquire chain write lock - this should never happen");

        let reward_amount =
            self.base_reward + transfers.iter().map(|t| t.get_fee()).sum::<u64>();
        let reward = Transaction::reward(miner_name, reward_amount)?;

        let mut transactions = vec![reward];
        transactions.extend(transfers.iter().cloned().map(Transaction::from));

        let (next_index, tip_hash) = {
            let blocks = self
                .blocks
                .read()
                .expect("Failed to acquire chain read lock - this should never happen");
            let tip = blocks.last().expect("chain always holds at least genesis");
            (tip.get_index() + 1, tip.get_hash().to_string())
        };

        info!(
            "Mining block {next_index} with {} transactions (difficulty: {})",
            transactions.len(),
            self.difficulty
        );
        let block = Block::new_block(next_index, transactions, tip_hash, self.difficulty)?;

        {
            let mut blocks = self
                .blocks
                .write()
                .expect("Failed to acquire chain write lock - this should never happen");
            let mut updated = blocks.clone();
            updated.push(block.clone());
            self.store.save(&updated)?;
            *blocks = updated;
        }

        match miner_address {
            Some(address) => utxo_set.credit(address, miner_name, reward_amount)?,
            None => warn!(
                "Mining reward of {reward_amount} for {miner_name} was not credited: no miner address"
            ),
        }

        Ok(block)
    }

    /// Whole-chain integrity check. Read-only and re-runnable at any time.
    ///
    /// For every block after genesis, in order: the stored hash must match a
    /// recomputation from the block's own fields, satisfy the difficulty,
    /// and link to the previous block's stored hash. The first violation is
    /// reported with the offending block's index; nothing is repaired.
    pub fn validate(&self) -> Result<()> {
        let blocks = self
            .blocks
            .read()
            .expect("Failed to acquire chain read lock - this should never happen");

        for i in 1..blocks.len() {
            let current = &blocks[i];
            let previous = &blocks[i - 1];

            let recomputed = current.compute_hash()?;
            if recomputed != current.get_hash() {
                return Err(LedgerError::ChainIntegrity {
                    index: current.get_index(),
                    reason: "stored hash does not match recomputed hash".to_string(),
                });
            }

            if !ProofOfWork::meets_difficulty(current.get_hash(), self.difficulty) {
                return Err(LedgerError::ChainIntegrity {
                    index: current.get_index(),
                    reason: "hash does not satisfy the proof-of-work difficulty".to_string(),
                });
            }

            if current.get_previous_hash() != previous.get_hash() {
                return Err(LedgerError::ChainIntegrity {
                    index: current.get_index(),
                    reason: "previous-hash link is broken".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Index of the tip block.
    pub fn height(&self) -> u64 {
        let blocks = self
            .blocks
            .read()
            .expect("Failed to acquire chain read lock - this should never happen");
        blocks.last().expect("chain always holds at least genesis").get_index()
    }

    pub fn len(&self) -> usize {
        let blocks = self
            .blocks
            .read()
            .expect("Failed to acquire chain read lock - this should never happen");
        blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_tip_hash(&self) -> String {
        let blocks = self
            .blocks
            .read()
            .expect("Failed to acquire chain read lock - this should never happen");
        blocks
            .last()
            .expect("chain always holds at least genesis")
            .get_hash()
            .to_string()
    }

    /// Snapshot of the whole chain, oldest first.
    pub fn blocks(&self) -> Vec<Block> {
        let blocks = self
            .blocks
            .read()
            .expect("Failed to acquire chain read lock - this should never happen");
        blocks.clone()
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn get_base_reward(&self) -> u64 {
        self.base_reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn test_settings() -> Settings {
        Settings {
            difficulty: 1,
            ..Settings::default()
        }
    }

    fn fresh_chain() -> (Blockchain, Arc<MemoryStore<Block>>) {
        let store = Arc::new(MemoryStore::new());
        let chain = Blockchain::initialize(store.clone(), &test_settings()).unwrap();
        (chain, store)
    }

    #[test]
    fn test_genesis_invariant() {
        let (chain, _) = fresh_chain();

        assert_eq!(chain.len(), 1);
        let blocks = chain.blocks();
        let genesis = &blocks[0];
        assert_eq!(genesis.get_index(), 0);
        assert_eq!(genesis.get_previous_hash(), GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.get_transactions().len(), 1);
        assert!(genesis.get_transactions()[0].is_coinbase());

        // Validation is trivially true for a single block
        chain.validate().unwrap();
    }

    #[test]
    fn test_initialize_reloads_instead_of_remining() {
        let (chain, store) = fresh_chain();
        let genesis_hash = chain.get_tip_hash();

        let reloaded = Blockchain::initialize(store, &test_settings()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get_tip_hash(), genesis_hash);
    }

    #[test]
    fn test_append_links_and_credits() {
        let (chain, _) = fresh_chain();
        let utxo_set = UTXOSet::new(Arc::new(MemoryStore::new()));

        let transfer = PendingTransfer::new("Alice", "Bob", 40, Some(1)).unwrap();
        let block = chain
            .append_block(&[transfer], "Carol", Some("addr-carol"), &utxo_set)
            .unwrap();

        assert_eq!(block.get_index(), 1);
        assert_eq!(block.get_previous_hash(), chain.blocks()[0].get_hash());
        assert_eq!(chain.height(), 1);

        // Reward first: base 3 + fee 1
        let transactions = block.get_transactions();
        assert_eq!(transactions.len(), 2);
        assert!(transactions[0].is_coinbase());
        assert_eq!(transactions[0].get_amount(), 4);
        assert_eq!(transactions[0].get_recipient(), "Carol");

        assert_eq!(utxo_set.balance("addr-carol").unwrap(), 4);
        chain.validate().unwrap();
    }

    #[test]
    fn test_append_without_miner_address_skips_credit() {
        let (chain, _) = fresh_chain();
        let utxo_set = UTXOSet::new(Arc::new(MemoryStore::new()));

        let transfer = PendingTransfer::new("Alice", "Bob", 40, None).unwrap();
        chain
            .append_block(&[transfer], "Carol", None, &utxo_set)
            .unwrap();

        // The reward sits in the block but no ledger entry was created
        assert_eq!(chain.len(), 2);
        assert!(utxo_set.entries().unwrap().is_empty());
    }

    fn tamper_block(store: &Arc<MemoryStore<Block>>, index: usize, field: &str, to: serde_json::Value) {
        let blocks = store.load().unwrap();
        let mut values: Vec<serde_json::Value> = blocks
            .iter()
            .map(|b| serde_json::to_value(b).unwrap())
            .collect();
        values[index][field] = to;
        let tampered: Vec<Block> = values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        store.save(&tampered).unwrap();
    }

    #[test]
    fn test_validate_detects_recomputation_mismatch() {
        let (chain, store) = fresh_chain();
        let utxo_set = UTXOSet::new(Arc::new(MemoryStore::new()));
        let transfer = PendingTransfer::new("Alice", "Bob", 40, None).unwrap();
        chain
            .append_block(&[transfer], "Carol", None, &utxo_set)
            .unwrap();

        // Inflate the mined transfer amount in the stored record
        let blocks = store.load().unwrap();
        let mut value = serde_json::to_value(&blocks[1]).unwrap();
        value["transactions"][1]["amount"] = serde_json::json!(4000);
        let mut tampered = blocks.clone();
        tampered[1] = serde_json::from_value(value).unwrap();
        store.save(&tampered).unwrap();

        let reloaded = Blockchain::initialize(store, &test_settings()).unwrap();
        match reloaded.validate() {
            Err(LedgerError::ChainIntegrity { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected ChainIntegrity, got {other:?}"),
        }
        assert!(!reloaded.is_valid());
    }

    #[test]
    fn test_validate_detects_broken_link() {
        let (chain, store) = fresh_chain();
        let utxo_set = UTXOSet::new(Arc::new(MemoryStore::new()));
        chain
            .append_block(
                &[PendingTransfer::new("Alice", "Bob", 40, None).unwrap()],
                "Carol",
                None,
                &utxo_set,
            )
            .unwrap();
        chain
            .append_block(
                &[PendingTransfer::new("Bob", "Alice", 5, None).unwrap()],
                "Carol",
                None,
                &utxo_set,
            )
            .unwrap();

        // Replace block 1 with a different self-valid block so block 2 no
        // longer links to it.
        let blocks = store.load().unwrap();
        let replacement = Block::new_block(
            1,
            vec![Transaction::reward("Eve", 7).unwrap()],
            blocks[0].get_hash().to_string(),
            1,
        )
        .unwrap();
        let mut tampered = blocks.clone();
        tampered[1] = replacement;
        store.save(&tampered).unwrap();

        let reloaded = Blockchain::initialize(store, &test_settings()).unwrap();
        match reloaded.validate() {
            Err(LedgerError::ChainIntegrity { index, reason }) => {
                assert_eq!(index, 2);
                assert!(reason.contains("link"));
            }
            other => panic!("expected ChainIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_detects_missing_proof_of_work() {
        let (chain, store) = fresh_chain();
        let utxo_set = UTXOSet::new(Arc::new(MemoryStore::new()));
        chain
            .append_block(
                &[PendingTransfer::new("Alice", "Bob", 40, None).unwrap()],
                "Carol",
                None,
                &utxo_set,
            )
            .unwrap();

        // Force a hash without the required prefix, consistent with a
        // recomputation by picking whatever the payload hashes to at a
        // nonce that was never mined.
        let blocks = store.load().unwrap();
        let mut candidate = None;
        for nonce in 0..100_000u64 {
            let hash = blocks[1].calculate_hash(nonce).unwrap();
            if !hash.starts_with('0') {
                candidate = Some((nonce, hash));
                break;
            }
        }
        let (nonce, hash) = candidate.expect("a non-qualifying nonce exists");

        tamper_block(&store, 1, "nonce", serde_json::json!(nonce));
        tamper_block(&store, 1, "hash", serde_json::json!(hash));

        let reloaded = Blockchain::initialize(store, &test_settings()).unwrap();
        match reloaded.validate() {
            Err(LedgerError::ChainIntegrity { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("difficulty"));
            }
            other => panic!("expected ChainIntegrity, got {other:?}"),
        }
    }
}
