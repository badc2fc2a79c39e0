use crate::core::{ProofOfWork, Transaction};
use crate::error::Result;
use crate::utils::{canonical_json, current_timestamp, sha256_digest};
use data_encoding::HEXLOWER;
use log::info;
use serde::{Deserialize, Serialize};

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// One sealed record of the chain.
///
/// Constructed exactly once at mining time, or rebuilt from storage with its
/// nonce and hash already known (in which case proof-of-work is skipped and
/// verification is left to [`Blockchain::validate`]). Never mutated after
/// construction.
///
/// [`Blockchain::validate`]: crate::core::Blockchain::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: i64,
    transactions: Vec<Transaction>,
    previous_hash: String,
    nonce: u64,
    hash: String,
}

/// The hashed subset of a block's fields. Serialized canonically (sorted
/// keys), so the struct's field order here is irrelevant to the digest.
#[derive(Serialize)]
struct HashPayload<'a> {
    index: u64,
    timestamp: i64,
    transactions: &'a [Transaction],
    previous_hash: &'a str,
    nonce: u64,
}

impl Block {
    /// Mine a new block at the given difficulty.
    ///
    /// Blocks the caller until a qualifying nonce is found; expected work is
    /// exponential in `difficulty` and there is no upper bound on attempts.
    pub fn new_block(
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: String,
        difficulty: u32,
    ) -> Result<Block> {
        let mut block = Block {
            index,
            timestamp: current_timestamp()?,
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };

        info!("Starting proof-of-work for block {index} at difficulty {difficulty}");
        let pow = ProofOfWork::new_proof_of_work(&block, difficulty);
        let (nonce, hash) = pow.run()?;
        block.nonce = nonce;
        block.hash = hash;
        info!("Proof-of-work completed for block {index}: {}", block.hash);

        Ok(block)
    }

    /// Digest of the block payload under a candidate nonce.
    pub fn payload_digest(&self, nonce: u64) -> Result<Vec<u8>> {
        let payload = canonical_json(&HashPayload {
            index: self.index,
            timestamp: self.timestamp,
            transactions: &self.transactions,
            previous_hash: &self.previous_hash,
            nonce,
        })?;
        Ok(sha256_digest(payload.as_bytes()))
    }

    /// Hex hash of the block payload under a candidate nonce.
    pub fn calculate_hash(&self, nonce: u64) -> Result<String> {
        Ok(HEXLOWER.encode(&self.payload_digest(nonce)?))
    }

    /// Recompute this block's hash from its own stored fields.
    pub fn compute_hash(&self) -> Result<String> {
        self.calculate_hash(self.nonce)
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }
}
