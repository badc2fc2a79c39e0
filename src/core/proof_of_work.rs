use crate::core::Block;
use crate::error::Result;
use data_encoding::HEXLOWER;
use num_bigint::{BigInt, Sign};
use std::borrow::Borrow;
use std::ops::ShlAssign;

const HEX_BITS_PER_CHAR: usize = 4;
const HEX_HASH_LEN: usize = 64;

/// Nonce search for one block.
///
/// Difficulty counts leading zero hex characters of the block hash. The
/// search compares raw digests against a numeric target instead of encoding
/// every attempt: a 256-bit digest below `1 << (256 - 4d)` is exactly a hex
/// string with `d` leading zeros.
pub struct ProofOfWork<'a> {
    block: &'a Block,
    target: BigInt,
}

impl<'a> ProofOfWork<'a> {
    pub fn new_proof_of_work(block: &'a Block, difficulty: u32) -> ProofOfWork<'a> {
        ProofOfWork {
            block,
            target: Self::target_for(difficulty),
        }
    }

    fn target_for(difficulty: u32) -> BigInt {
        let mut target = BigInt::from(1);
        target.shl_assign(256 - HEX_BITS_PER_CHAR * difficulty as usize);
        target
    }

    /// Search nonces from zero until the payload digest meets the target.
    /// Unbounded; runs to completion however long that takes.
    pub fn run(&self) -> Result<(u64, String)> {
        let mut nonce = 0u64;
        loop {
            let digest = self.block.payload_digest(nonce)?;
            let digest_int = BigInt::from_bytes_be(Sign::Plus, digest.as_slice());

            if digest_int.lt(self.target.borrow()) {
                return Ok((nonce, HEXLOWER.encode(digest.as_slice())));
            }
            nonce += 1;
        }
    }

    /// Whether a stored hex hash has the required leading zero characters.
    /// Anything that is not a full-length hash fails outright.
    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        hash.len() == HEX_HASH_LEN
            && hash
                .chars()
                .take(difficulty as usize)
                .all(|c| c == '0')
    }

    /// Validate a block's stored hash: it must match a recomputation from
    /// the block's own fields and satisfy the difficulty.
    pub fn validate(block: &Block, difficulty: u32) -> Result<bool> {
        let recomputed = block.compute_hash()?;
        Ok(recomputed == block.get_hash() && Self::meets_difficulty(block.get_hash(), difficulty))
    }
}
