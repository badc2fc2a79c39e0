use crate::core::{Block, Blockchain};
use crate::error::{LedgerError, Result};
use crate::identity::IdentityRegistry;
use crate::storage::{PendingPool, UTXOSet};
use log::info;

/// Mining orchestration: drains the pending pool into one new block.
#[derive(Clone)]
pub struct Miner {
    chain: Blockchain,
    utxo_set: UTXOSet,
    pool: PendingPool,
    identities: IdentityRegistry,
}

impl Miner {
    pub fn new(
        chain: Blockchain,
        utxo_set: UTXOSet,
        pool: PendingPool,
        identities: IdentityRegistry,
    ) -> Miner {
        Miner {
            chain,
            utxo_set,
            pool,
            identities,
        }
    }

    /// Mine every pending transfer into a block credited to `miner`.
    ///
    /// The miner's address is looked up in the identity store, then the
    /// ledger; with no match the block is still mined and the reward loss
    /// is logged by the chain. Refuses an empty pool.
    pub fn mine_pending(&self, miner: &str) -> Result<Block> {
        let pending = self.pool.all()?;
        if pending.is_empty() {
            return Err(LedgerError::Transaction(
                "No pending transfers to mine".to_string(),
            ));
        }

        let miner_address = self.resolve_miner_address(miner)?;
        let block =
            self.chain
                .append_block(&pending, miner, miner_address.as_deref(), &self.utxo_set)?;
        self.pool.clear()?;

        info!(
            "Mined block {} holding {} pending transfers",
            block.get_index(),
            pending.len()
        );
        Ok(block)
    }

    fn resolve_miner_address(&self, miner: &str) -> Result<Option<String>> {
        if let Some(address) = self.identities.address_of(miner)? {
            return Ok(Some(address));
        }
        Ok(self
            .utxo_set
            .find_by_name(miner)?
            .map(|e| e.get_address().to_string()))
    }
}
